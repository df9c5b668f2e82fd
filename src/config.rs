use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from_name: String,
    pub email_from_address: String,
    pub face_provider_base_url: String,
    pub face_provider_api_key: String,
    pub face_provider_secret_key: String,
    pub face_match_threshold: f64,
    pub monthly_schedule_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a valid port number"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRY_HOURS must be a number"),
            smtp_host: env::var("SMTP_HOST").expect("SMTP_HOST must be set"),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .expect("SMTP_PORT must be a number"),
            smtp_username: env::var("SMTP_USERNAME").expect("SMTP_USERNAME must be set"),
            smtp_password: env::var("SMTP_PASSWORD").expect("SMTP_PASSWORD must be set"),
            email_from_name: env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "HR Operations".to_string()),
            email_from_address: env::var("EMAIL_FROM_ADDRESS")
                .expect("EMAIL_FROM_ADDRESS must be set"),
            face_provider_base_url: env::var("FACE_PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://sandbox.faceid.example.com".to_string()),
            face_provider_api_key: env::var("FACE_PROVIDER_API_KEY")
                .expect("FACE_PROVIDER_API_KEY must be set"),
            face_provider_secret_key: env::var("FACE_PROVIDER_SECRET_KEY")
                .expect("FACE_PROVIDER_SECRET_KEY must be set"),
            face_match_threshold: env::var("FACE_MATCH_THRESHOLD")
                .unwrap_or_else(|_| "0.85".to_string())
                .parse()
                .expect("FACE_MATCH_THRESHOLD must be a number"),
            monthly_schedule_enabled: env::var("MONTHLY_SCHEDULE_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .expect("MONTHLY_SCHEDULE_ENABLED must be true or false"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
