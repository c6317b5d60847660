use async_trait::async_trait;
use replay_engine::{ConsoleDriver, Key, Target};
use std::time::{Duration, Instant};
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::TypingData;
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    WebDriver(#[from] WebDriverError),
    #[error("{target} not found within {timeout:?}")]
    NotFound { target: Target, timeout: Duration },
}

/// The result console page, driven over a WebDriver session.
pub struct WebDriverConsole<'a> {
    driver: &'a WebDriver,
    /// How long clicks and fills wait for their element to show up.
    action_timeout: Duration,
}

impl<'a> WebDriverConsole<'a> {
    pub const fn new(driver: &'a WebDriver, action_timeout: Duration) -> Self {
        Self {
            driver,
            action_timeout,
        }
    }

    async fn find_visible(
        &self,
        target: &Target,
        timeout: Duration,
    ) -> Result<Option<WebElement>, WebDriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            for element in self.driver.find_all(locator(target)).await? {
                if element.is_displayed().await.unwrap_or(false) {
                    return Ok(Some(element));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn require(&self, target: &Target) -> Result<WebElement, ConsoleError> {
        self.find_visible(target, self.action_timeout)
            .await?
            .ok_or_else(|| ConsoleError::NotFound {
                target: target.clone(),
                timeout: self.action_timeout,
            })
    }

    async fn body(&self) -> Result<WebElement, ConsoleError> {
        Ok(self.driver.find(By::Tag("body")).await?)
    }
}

#[async_trait]
impl ConsoleDriver for WebDriverConsole<'_> {
    type Error = ConsoleError;

    async fn goto(&self, url: &str) -> Result<(), ConsoleError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn is_visible(&self, target: &Target, timeout: Duration) -> Result<bool, ConsoleError> {
        Ok(self.find_visible(target, timeout).await?.is_some())
    }

    async fn click(&self, target: &Target) -> Result<(), ConsoleError> {
        self.require(target).await?.click().await?;
        Ok(())
    }

    async fn fill(&self, target: &Target, text: &str) -> Result<(), ConsoleError> {
        let element = self.require(target).await?;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), ConsoleError> {
        let body = self.body().await?;
        for ch in text.chars() {
            body.send_keys(ch.to_string()).await?;
        }
        Ok(())
    }

    async fn press(&self, key: Key) -> Result<(), ConsoleError> {
        self.body().await?.send_keys(typing(key)).await?;
        Ok(())
    }

    async fn press_on(&self, target: &Target, key: Key) -> Result<(), ConsoleError> {
        self.require(target).await?.send_keys(typing(key)).await?;
        Ok(())
    }
}

fn typing(key: Key) -> TypingData {
    match key {
        Key::Enter => thirtyfour::Key::Enter.into(),
        Key::Char(ch) => ch.to_string().into(),
    }
}

fn locator(target: &Target) -> By {
    match target {
        Target::Button(label) => By::XPath(button_xpath(label)),
        Target::Role(role) => By::Css(role_css(role)),
        Target::Css(selector) => By::Css(selector.clone()),
    }
}

fn button_xpath(label: &str) -> String {
    let quote = if label.contains('"') { '\'' } else { '"' };
    format!("//button[contains(normalize-space(.), {quote}{label}{quote})]")
}

fn role_css(role: &str) -> String {
    match role {
        "textbox" => {
            "input[type=text], input:not([type]), textarea, [role=textbox]".to_string()
        }
        "button" => "button, [role=button]".to_string(),
        other => format!("[role={other}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_xpath_matches_on_text() {
        assert_eq!(
            button_xpath("START"),
            r#"//button[contains(normalize-space(.), "START")]"#
        );
        assert_eq!(
            button_xpath(r#"say "hi""#),
            r#"//button[contains(normalize-space(.), 'say "hi"')]"#
        );
    }

    #[test]
    fn textbox_role_covers_implicit_inputs() {
        let css = role_css("textbox");
        assert!(css.contains("textarea"));
        assert!(css.contains("[role=textbox]"));
        assert_eq!(role_css("dialog"), "[role=dialog]");
    }
}
