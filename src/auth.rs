//! Credential Store
//!
//! Google APIの認証情報（OAuth 2.0 のアクセストークン）を管理するモジュール。
//!
//! 1. 保存済みの認証情報が有効ならそのまま使う
//! 2. 期限切れでリフレッシュトークンがあれば更新して保存する
//! 3. それ以外はブラウザによる対話的な認可フローで新規取得して保存する
//!
//! 保存形式はGoogleのクライアントライブラリが書き出す`token.json`
//! （authorized user 形式）と互換です。

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use crate::error::PullDataError;

/// スプレッドシートの読み取り専用スコープ
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// 期限の何秒前から期限切れとみなすか
const EXPIRY_SKEW_SECS: i64 = 10;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

/// 保存される認証情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// アクセストークン
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// リフレッシュトークン（更新能力）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// アクセストークンの有効期限（`None`は無期限）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// アクセストークンのみを持つ認証情報（期限なし、更新不可）
    pub fn from_access_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            refresh_token: None,
            token_uri: default_token_uri(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: Vec::new(),
            expiry: None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// 期限切れかどうか（期限が設定されていない場合は常に`false`）
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .map_or(false, |expiry| now >= expiry - Duration::seconds(EXPIRY_SKEW_SECS))
    }

    /// アクセストークンがあり、期限切れでない
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.token.is_some() && !self.is_expired(now)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// トークンエンドポイントの応答を反映する
    ///
    /// 新しいリフレッシュトークンが返されなかった場合は既存のものを保持します。
    pub fn apply_grant(&mut self, grant: TokenGrant, now: DateTime<Utc>) {
        self.token = Some(grant.access_token);
        self.expiry = grant.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(refresh_token) = grant.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = grant.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }
}

/// トークンエンドポイントの応答
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// クライアントシークレット（`credentials.json`の`installed`または`web`）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ClientConfig {
    /// クライアントシークレットファイルを読み込む
    ///
    /// このファイルはGoogle Cloud Consoleからダウンロードするもので、
    /// 本プログラムが作成することはありません。
    pub fn load(path: &Path) -> Result<Self, PullDataError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PullDataError::Auth(format!(
                "cannot read client secret file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, PullDataError> {
        #[derive(Deserialize)]
        struct ClientSecretsFile {
            installed: Option<ClientConfig>,
            web: Option<ClientConfig>,
        }

        let file: ClientSecretsFile = serde_json::from_str(contents)?;
        file.installed.or(file.web).ok_or_else(|| {
            PullDataError::Auth(
                "client secret file has neither an 'installed' nor a 'web' section".to_string(),
            )
        })
    }
}

/// 認証情報の更新と新規取得
pub trait Authorizer {
    /// リフレッシュトークンでアクセストークンを更新する
    fn refresh(&self, credential: &Credential) -> Result<TokenGrant, PullDataError>;

    /// 対話的な認可フローで認証情報を新規取得する
    fn authorize(&self, scopes: &[String]) -> Result<Credential, PullDataError>;
}

/// 保存先ファイルと`Authorizer`を組み合わせた認証情報ストア
#[derive(Debug)]
pub struct CredentialStore<A: Authorizer> {
    path: PathBuf,
    scopes: Vec<String>,
    authorizer: A,
}

impl<A: Authorizer> CredentialStore<A> {
    pub fn new(path: impl Into<PathBuf>, scopes: Vec<String>, authorizer: A) -> Self {
        Self {
            path: path.into(),
            scopes,
            authorizer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 有効な認証情報を返す（必要に応じて更新・新規取得し、保存する）
    pub fn get_credential(&self) -> Result<Credential, PullDataError> {
        self.get_credential_at(Utc::now())
    }

    /// 現在時刻を指定して`get_credential`を実行する
    pub fn get_credential_at(&self, now: DateTime<Utc>) -> Result<Credential, PullDataError> {
        let stored = self.load()?;

        if let Some(credential) = &stored {
            if credential.is_valid(now) {
                tracing::debug!("Using stored credential from {}", self.path.display());
                return Ok(credential.clone());
            }
        }

        let credential = match stored {
            Some(mut credential) if credential.is_expired(now) && credential.can_refresh() => {
                tracing::info!("Refreshing expired access token");
                let grant = self.authorizer.refresh(&credential)?;
                credential.apply_grant(grant, now);
                credential
            }
            _ => {
                tracing::info!("No valid credential found; starting authorization flow");
                self.authorizer.authorize(&self.scopes)?
            }
        };

        self.save(&credential)?;
        Ok(credential)
    }

    /// 保存済みの認証情報を読み込む
    ///
    /// ファイルがない場合、または内容を解析できない場合は`None`を返します。
    pub fn load(&self) -> Result<Option<Credential>, PullDataError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Credential>(&contents) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable credential file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// 認証情報を保存する（既存ファイルは上書き）
    pub fn save(&self, credential: &Credential) -> Result<(), PullDataError> {
        let json = serde_json::to_string_pretty(credential)?;
        std::fs::write(&self.path, json)?;
        restrict_permissions(&self.path)?;
        tracing::debug!("Saved credential to {}", self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), PullDataError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), PullDataError> {
    Ok(())
}

/// インストール型アプリケーションの認可フロー
///
/// ループバックアドレスで一時的なHTTPサーバーを待ち受け、ブラウザで同意した結果の
/// 認可コードを受け取ってトークンと交換します（PKCE S256）。
#[derive(Debug)]
pub struct InstalledAppFlow {
    client_secret_path: PathBuf,
    http: reqwest::blocking::Client,
    open_browser: bool,
}

impl InstalledAppFlow {
    pub fn new(client_secret_path: impl Into<PathBuf>) -> Result<Self, PullDataError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client_secret_path: client_secret_path.into(),
            http,
            open_browser: true,
        })
    }

    /// ブラウザを自動で開くかどうか（`false`ならURLの表示のみ）
    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    fn post_token(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenGrant, PullDataError> {
        let response = self
            .http
            .post(token_uri)
            .form(form)
            .send()
            .map_err(|e| PullDataError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PullDataError::Auth(format!(
                "token endpoint returned {}: {}",
                status,
                oauth_error_message(&body)
            )));
        }

        response
            .json::<TokenGrant>()
            .map_err(|e| PullDataError::Auth(format!("malformed token response: {}", e)))
    }

    /// リダイレクトを1件受け取るまで待つ
    ///
    /// `code`も`error`も含まないリクエスト（faviconなど）は無視します。
    fn wait_for_redirect(&self, listener: &TcpListener) -> Result<RedirectParams, PullDataError> {
        for stream in listener.incoming() {
            let mut stream = stream?;
            let mut reader = BufReader::new(stream.try_clone()?);

            let mut request_line = String::new();
            reader.read_line(&mut request_line)?;
            // ヘッダーは読み捨てる
            let mut header = String::new();
            while reader.read_line(&mut header)? > 2 {
                header.clear();
            }

            let params = parse_redirect_request(&request_line);
            let body = if params.code.is_some() {
                "The authentication flow has completed. You may close this window."
            } else if params.error.is_some() {
                "Authorization was not granted. You may close this window."
            } else {
                "Waiting for authorization."
            };
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )?;
            stream.flush()?;

            if params.code.is_some() || params.error.is_some() {
                return Ok(params);
            }
        }
        Err(PullDataError::Auth(
            "local redirect server stopped before authorization completed".to_string(),
        ))
    }
}

impl Authorizer for InstalledAppFlow {
    fn refresh(&self, credential: &Credential) -> Result<TokenGrant, PullDataError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| PullDataError::Auth("credential has no refresh token".to_string()))?;

        self.post_token(
            &credential.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
            ],
        )
    }

    fn authorize(&self, scopes: &[String]) -> Result<Credential, PullDataError> {
        let client = ClientConfig::load(&self.client_secret_path)?;

        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{}/", port);

        let state = random_token(30);
        let verifier = random_token(64);
        let url = authorization_url(
            &client,
            &redirect_uri,
            scopes,
            &state,
            &pkce_challenge(&verifier),
        );

        println!("Please visit this URL to authorize this application: {}", url);
        if self.open_browser {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Could not open a browser: {}", e);
            }
        }

        let params = self.wait_for_redirect(&listener)?;
        if let Some(error) = params.error {
            return Err(PullDataError::Auth(format!("authorization denied: {}", error)));
        }
        if params.state.as_deref() != Some(state.as_str()) {
            return Err(PullDataError::Auth(
                "state mismatch in authorization response".to_string(),
            ));
        }
        let code = params
            .code
            .ok_or_else(|| PullDataError::Auth("authorization code missing".to_string()))?;

        let grant = self.post_token(
            &client.token_uri,
            &[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
                ("code_verifier", verifier.as_str()),
            ],
        )?;

        let mut credential = Credential {
            token: None,
            refresh_token: None,
            token_uri: client.token_uri,
            client_id: client.client_id,
            client_secret: client.client_secret,
            scopes: scopes.to_vec(),
            expiry: None,
        };
        credential.apply_grant(grant, Utc::now());
        Ok(credential)
    }
}

/// 認可リクエストのURLを組み立てる
pub fn authorization_url(
    client: &ClientConfig,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
    code_challenge: &str,
) -> String {
    let scope = scopes.join(" ");
    let params = [
        ("response_type", "code"),
        ("client_id", client.client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("scope", scope.as_str()),
        ("state", state),
        ("code_challenge", code_challenge),
        ("code_challenge_method", "S256"),
        ("access_type", "offline"),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", client.auth_uri, query)
}

/// PKCEのコードチャレンジ（`BASE64URL(SHA256(verifier))`、パディングなし）
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// リダイレクトで受け取ったパラメーター
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// リクエスト行（`GET /?code=...&state=... HTTP/1.1`）からパラメーターを取り出す
pub fn parse_redirect_request(request_line: &str) -> RedirectParams {
    let mut params = RedirectParams::default();

    let target = request_line.split_whitespace().nth(1).unwrap_or("");
    let Some((_, query)) = target.split_once('?') else {
        return params;
    };

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = value.replace('+', " ");
        let value = urlencoding::decode(&value)
            .map(|v| v.into_owned())
            .unwrap_or(value);
        match key {
            "code" => params.code = Some(value),
            "state" => params.state = Some(value),
            "error" => params.error = Some(value),
            _ => {}
        }
    }
    params
}

/// OAuthエラー応答（`{"error", "error_description"}`）からメッセージを取り出す
fn oauth_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OAuthError {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    }

    match serde_json::from_str::<OAuthError>(body) {
        Ok(OAuthError {
            error,
            error_description: Some(desc),
        }) => format!("{} ({})", error, desc),
        Ok(OAuthError { error, .. }) => error,
        Err(_) => body.trim().chars().take(200).collect(),
    }
}
