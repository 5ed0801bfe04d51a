use deprompt::adapters::http::{status_for, ErrorResponse};
use deprompt::utils::logger;
use deprompt::{openai_improver, ImprovementRequest, ImprovementResult, ServiceConfig, SharedImprover};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Request {
    #[serde(default)]
    pub prompt: String,
    pub target_model: Option<String>,
    pub context: Option<String>,
}

#[derive(Serialize)]
pub struct Response {
    pub status_code: u16,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Improved(ImprovementResult),
    Failed(ErrorResponse),
}

async fn function_handler(
    improver: &SharedImprover,
    event: LambdaEvent<Request>,
) -> Result<Response, Error> {
    tracing::info!("Starting prompt improvement Lambda function");

    let payload = event.payload;
    let request = ImprovementRequest::new(payload.prompt, payload.target_model.as_deref())
        .with_context(payload.context.filter(|c| !c.trim().is_empty()));

    // 分類過的錯誤以結構化回應回傳，不當作 Lambda 執行失敗
    let response = match improver.improve(&request).await {
        Ok(result) => Response {
            status_code: 200,
            body: ResponseBody::Improved(result),
        },
        Err(e) => {
            tracing::error!(
                "❌ Improvement failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            Response {
                status_code: status_for(&e).as_u16(),
                body: ResponseBody::Failed(ErrorResponse::from_error(&e)),
            }
        }
    };

    tracing::info!("Prompt improvement Lambda function completed");
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = ServiceConfig::from_env();
    if !config.api_key_configured() {
        tracing::error!("❌ API_KEY environment variable is not set");
    }

    let improver = openai_improver(config)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    let improver = &improver;

    run(service_fn(move |event: LambdaEvent<Request>| async move {
        function_handler(improver, event).await
    }))
    .await
}
