use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub host: String,
  /// Built client bundle served for every non-API path
  pub static_dir: PathBuf,
  /// Browser origin allowed to send credentialed requests; permissive CORS when unset
  pub cors_origin: Option<String>,
  pub cookie_secure: bool,
  /// JSON document (users/sessions/songs/likes) imported into an empty database
  pub import_path: Option<PathBuf>,
}

impl Config {
  pub fn from_env() -> Result<Self, String> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
    let database_url = lookup("DATABASE_URL")
      .unwrap_or_else(|| "sqlite:songboard.db".to_string());

    let port = lookup("PORT")
      .unwrap_or_else(|| "4000".to_string())
      .parse()
      .map_err(|e| format!("Invalid PORT: {}", e))?;

    let host = lookup("HOST")
      .unwrap_or_else(|| "127.0.0.1".to_string());

    let static_dir = lookup("STATIC_DIR")
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from("client/dist"));

    let cors_origin = lookup("CORS_ORIGIN").filter(|o| !o.trim().is_empty());

    let cookie_secure = match lookup("COOKIE_SECURE") {
      Some(v) => v
        .parse()
        .map_err(|e| format!("Invalid COOKIE_SECURE: {}", e))?,
      None => false,
    };

    let import_path = lookup("IMPORT_PATH")
      .filter(|p| !p.trim().is_empty())
      .map(PathBuf::from);

    Ok(Self {
      database_url,
      port,
      host,
      static_dir,
      cors_origin,
      cookie_secure,
      import_path,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}
