use anyhow::Result;

use super::config_model::{Auth, Database, DotEnvyConfig, Gemini, Payments, Server};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let auth = Auth {
        jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
    };

    let gemini = Gemini {
        api_key: std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY is invalid"),
        model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
    };

    let payments = Payments {
        base_url: std::env::var("PAYMENT_PROVIDER_URL").expect("PAYMENT_PROVIDER_URL is invalid"),
        secret_key: std::env::var("PAYMENT_PROVIDER_SECRET")
            .expect("PAYMENT_PROVIDER_SECRET is invalid"),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        auth,
        gemini,
        payments,
    })
}

pub fn get_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    Ok(std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"))
}
