use crate::auth::{self, AuthError};
use crate::callable::https::HttpsCallableClient;
use crate::cli::{Args, ProtocolVersion};
use crate::device_id;
use crate::scan::{ScanValidator, ValidationProtocol};
use std::sync::Arc;
use std::time::Duration;


#[derive(Clone)]
pub struct AppContext {
    pub validator: ScanValidator,
    pub event_id: String,
    pub scan_deadline: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("`{0}` is not a valid device id")]
    InvalidDeviceId(String),
}

pub fn init(args: &Args) -> Result<AppContext, InitError> {
    let auth = auth::init(args)?;
    let callable = Arc::new(HttpsCallableClient::new(args.functions_url.clone()));
    let validator = ScanValidator::new(auth, callable, protocol(args)?);
    tracing::info!(
        function = validator.protocol().function_name(),
        functions_url = %args.functions_url,
        "Initialized validation client."
    );
    Ok(AppContext {
        validator,
        event_id: args.event_id.clone(),
        scan_deadline: args.scan_deadline_ms.map(Duration::from_millis),
    })
}

fn protocol(args: &Args) -> Result<ValidationProtocol, InitError> {
    match args.protocol {
        ProtocolVersion::V1 => Ok(ValidationProtocol::V1),
        ProtocolVersion::V2 => {
            let device_id = match &args.device_id {
                Some(device_id) if device_id::is_valid(device_id) => device_id.clone(),
                Some(device_id) => return Err(InitError::InvalidDeviceId(device_id.clone())),
                None => {
                    let device_id = device_id::generate();
                    tracing::warn!(
                        device_id = %device_id,
                        "No `--device-id` given, generated one for this run."
                    );
                    device_id
                }
            };
            Ok(ValidationProtocol::V2 { device_id })
        }
    }
}
