pub const SCANNER_API_KEY: &str = "SCANNER_API_KEY";
pub const SCANNER_REFRESH_TOKEN: &str = "SCANNER_REFRESH_TOKEN";
pub const SCANNER_DEV_SIGNING_KEY: &str = "SCANNER_DEV_SIGNING_KEY";

#[macro_export]
macro_rules! warn_if_env_var_is_missing {
    ($var:expr, $message:expr) => {
        if std::env::var($var).is_err() {
            tracing::warn!(
                "The `{}` environment variable isn't set. {}",
                $var,
                $message
            );
        }
    };
}
