use std::{ops::Deref, sync::Arc};

use fake_user_agent::get_chrome_rua;
use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Client, ClientBuilder, Url,
};
use reqwest_cookie_store::{CookieStore, CookieStoreMutex};

use crate::error::LektorResult;

/// Connection pool shared by every job of the process.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    cookies_store: Arc<CookieStoreMutex>,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder) -> LektorResult<Self> {
        let cookies_store = Arc::new(CookieStoreMutex::new(CookieStore::default()));
        let client = builder.cookie_provider(cookies_store.clone()).build()?;

        Ok(Self {
            client,
            cookies_store,
        })
    }

    /// Adds `name=value` pairs, as found in a browser `Cookie` header, for `url`.
    pub fn add_cookies<'a, I>(&self, cookies: I, url: &Url)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Ok(mut lock) = self.cookies_store.lock() else {
            tracing::warn!("Cookie store is poisoned, cookies are not added");
            return;
        };
        for cookie in cookies {
            if let Err(e) = lock.parse(cookie.trim(), url) {
                tracing::warn!("Ignoring invalid cookie {cookie:?}: {e}");
            }
        }
    }
}

impl Deref for HttpClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// Headers the player host checks before serving the embed page.
#[derive(Debug, Clone)]
pub struct BrowserHeaders {
    pub user_agent: String,
    /// Value of the `sec-ch-ua-platform` client hint, quotes included.
    pub platform: String,
}

impl BrowserHeaders {
    pub fn new<U, P>(user_agent: U, platform: P) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            user_agent: user_agent.into(),
            platform: platform.into(),
        }
    }

    pub fn to_header_map(&self) -> LektorResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        headers.insert("sec-ch-ua-platform", HeaderValue::from_str(&self.platform)?);
        Ok(headers)
    }
}

impl Default for BrowserHeaders {
    fn default() -> Self {
        Self::new(get_chrome_rua(), "\"Windows\"")
    }
}
