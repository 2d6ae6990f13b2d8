//! Headless Chrome driver over the DevTools protocol
//!
//! Each [`ChromiumDriver`] owns one Chrome process with a single tab. The
//! launcher hands out a fresh process per scenario so sessions never share
//! cookies.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::driver::{BrowserDriver, DriverError, DriverLauncher, DriverResult};
use crate::wait::{wait_for_result, WaitConfig};

/// Configuration for launching Chrome
#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    pub headless: bool,
    pub window_size: (u32, u32),

    /// Extra Chrome arguments
    pub args: Vec<String>,

    /// Chrome executable (None = auto-detect)
    pub chrome_path: Option<PathBuf>,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 720),
            args: vec![
                // Containers and CI runners usually lack user namespaces
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

impl ChromiumConfig {
    fn to_browser_config(&self) -> DriverResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder();

        if !self.headless {
            builder = builder.with_head();
        }

        builder = builder.window_size(self.window_size.0, self.window_size.1);

        // A private profile per process keeps parallel runs from sharing a
        // ProcessSingleton lock or each other's cookies.
        let user_data_dir =
            std::env::temp_dir().join(format!("formpilot-{}", uuid::Uuid::new_v4()));
        builder = builder.user_data_dir(user_data_dir);

        for arg in &self.args {
            builder = builder.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path.clone());
        }

        builder
            .build()
            .map_err(|e| DriverError::Launch(format!("invalid browser configuration: {e}")))
    }
}

/// Launches one Chrome process per session
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    config: ChromiumConfig,
}

impl ChromiumLauncher {
    pub fn new(config: ChromiumConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    async fn launch(&self) -> DriverResult<Box<dyn BrowserDriver>> {
        Ok(Box::new(ChromiumDriver::launch(&self.config).await?))
    }
}

/// A Chrome process driven through one tab
pub struct ChromiumDriver {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    pub async fn launch(config: &ChromiumConfig) -> DriverResult<Self> {
        debug!("Launching Chrome with {:?}", config);

        let (browser, mut handler) = Browser::launch(config.to_browser_config()?)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        // chromiumoxide only makes progress while its handler stream is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Launch(format!("failed to open tab: {e}")))?;

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
        })
    }

    async fn ensure_open(&self) -> DriverResult<()> {
        if self.browser.lock().await.is_none() {
            return Err(DriverError::Closed);
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> DriverResult<serde_json::Value> {
        self.ensure_open().await?;
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Run a snippet that reports `"ok"` or a failure token for `selector`
    async fn run_element_script(&self, selector: &str, body: &str) -> DriverResult<()> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return 'missing'; \
             if (el.disabled) return 'disabled'; \
             {body} }})()",
            sel = js_string(selector)?,
        );
        let status = self.evaluate(&script).await?;
        interpret_status(selector, status.as_str().unwrap_or("no-result"))
    }

    async fn find(&self, selector: &str) -> DriverResult<chromiumoxide::element::Element> {
        self.ensure_open().await?;
        self.page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

/// JSON-encode a value so it can be embedded as a JavaScript string literal
fn js_string(value: &str) -> DriverResult<String> {
    serde_json::to_string(value).map_err(|e| DriverError::Protocol(e.to_string()))
}

fn interpret_status(selector: &str, status: &str) -> DriverResult<()> {
    let reason = match status {
        "ok" => return Ok(()),
        "missing" => {
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
        "disabled" => "element is disabled",
        "no-option" => "no option with that value or label",
        "unchecked" => "checkbox did not become checked",
        _ => "unexpected script result",
    };
    Err(DriverError::NotInteractable {
        selector: selector.to_string(),
        reason: reason.to_string(),
    })
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.ensure_open().await?;
        debug!("goto {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_load(&self, timeout: Duration) -> DriverResult<()> {
        let this = self;
        wait_for_result(
            move || async move {
                let state = this.evaluate("document.readyState").await?;
                Ok(state.as_str() == Some("complete"))
            },
            WaitConfig::with_timeout(timeout),
            "document ready",
        )
        .await
    }

    async fn current_url(&self) -> DriverResult<String> {
        let href = self.evaluate("window.location.href").await?;
        href.as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::Protocol("window.location.href is not a string".into()))
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let script = format!("!!document.querySelector({})", js_string(selector)?);
        let (this, script) = (self, script.as_str());
        wait_for_result(
            move || async move {
                let found = this.evaluate(script).await?;
                Ok(found.as_bool().unwrap_or(false))
            },
            WaitConfig::with_timeout(timeout),
            &format!("selector '{selector}'"),
        )
        .await
        .map_err(|e| match e {
            DriverError::Timeout { .. } => DriverError::ElementNotFound {
                selector: selector.to_string(),
            },
            other => other,
        })
    }

    async fn type_text(&self, selector: &str, text: &str) -> DriverResult<()> {
        // Surface "disabled" before focusing, Cypress-style
        self.run_element_script(selector, "return 'ok';").await?;
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| DriverError::NotInteractable {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?
            .type_str(text)
            .await
            .map_err(|e| DriverError::NotInteractable {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> DriverResult<()> {
        let body = format!(
            "const want = {want}; \
             const opt = Array.from(el.options || []) \
               .find(o => o.value === want || o.text.trim() === want); \
             if (!opt) return 'no-option'; \
             el.value = opt.value; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return 'ok';",
            want = js_string(value)?,
        );
        self.run_element_script(selector, &body).await
    }

    async fn check(&self, selector: &str) -> DriverResult<()> {
        self.run_element_script(
            selector,
            "if (!el.checked) el.click(); return el.checked ? 'ok' : 'unchecked';",
        )
        .await
    }

    async fn click(&self, selector: &str) -> DriverResult<()> {
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| DriverError::NotInteractable {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn shutdown(&self) -> DriverResult<()> {
        if let Some(mut browser) = self.browser.lock().await.take() {
            debug!("Closing browser");
            browser
                .close()
                .await
                .map_err(|e| DriverError::Protocol(e.to_string()))?;
        }
        self.handler.abort();
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        // chromiumoxide kills the child process when the Browser is dropped
        self.handler.abort();
    }
}
