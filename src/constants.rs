pub mod warehouse {
    pub const STATEMENTS_PATH: &str = "/api/v2/statements";
    pub const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";
    pub const TOKEN_TYPE_KEYPAIR_JWT: &str = "KEYPAIR_JWT";
    pub const TOKEN_TYPE_OAUTH: &str = "OAUTH";
    pub const STATEMENT_HANDLE_FIELD: &str = "statementHandle";
}

pub mod delay {
    pub const DEFAULT_DELAY_MS: u64 = 100;
}

pub mod environment {
    pub const ADDRESS: &str = "ADDRESS";
    pub const CLIENT_CREDENTIALS_TOKEN_URL: &str = "OAUTH2_CLIENT_CREDENTIALS_TOKEN_URL";
    pub const CLIENT_CREDENTIALS_CLIENT_ID: &str = "OAUTH2_CLIENT_CREDENTIALS_CLIENT_ID";
    pub const CLIENT_CREDENTIALS_SCOPE: &str = "OAUTH2_CLIENT_CREDENTIALS_SCOPE";
    pub const CLIENT_CREDENTIALS_AUDIENCE: &str = "OAUTH2_CLIENT_CREDENTIALS_AUDIENCE";
    pub const CLIENT_CREDENTIALS_AUTH_STYLE: &str = "OAUTH2_CLIENT_CREDENTIALS_AUTH_STYLE";
}

pub mod secrets {
    pub const BEARER_AUTH_TOKEN: &str = "BEARER_AUTH_TOKEN";
    pub const BASIC_USERNAME: &str = "BASIC_USERNAME";
    pub const BASIC_PASSWORD: &str = "BASIC_PASSWORD";
    pub const AUTHORIZATION_CODE_ACCESS_TOKEN: &str = "OAUTH2_AUTHORIZATION_CODE_ACCESS_TOKEN";
    pub const CLIENT_CREDENTIALS_CLIENT_SECRET: &str = "OAUTH2_CLIENT_CREDENTIALS_CLIENT_SECRET";
}

pub mod auth_style {
    pub const IN_HEADER: &str = "InHeader";
    pub const IN_PARAMS: &str = "InParams";
}

pub mod limits {
    pub const LOG_BODY_MAX_BYTES: usize = 2 * 1024;
    pub const ERROR_BODY_MAX_BYTES: usize = 16 * 1024;
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http", "https"];
}
