//! `ExchangeService` over HTTP

use crate::PointsClient;
use async_trait::async_trait;
use jifeng_core::{CodeDispatch, ExchangeRequest, ExchangeService, Result};

#[async_trait]
impl ExchangeService for PointsClient {
    async fn send_verification_code(&self) -> Result<CodeDispatch> {
        let echoed_code = self.send_sms_code().await?;
        Ok(CodeDispatch { echoed_code })
    }

    async fn submit_exchange(&self, request: &ExchangeRequest) -> Result<()> {
        self.exchange(request).await
    }
}
