// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use super::{ops, ApiClient};
use crate::error::ClientResult;
use crate::http::{RequestDescriptor, Transport};
use crate::models::LlmConfig;

impl<T: Transport> ApiClient<T> {
    pub async fn llm_config(&self) -> ClientResult<LlmConfig> {
        self.pipeline
            .call(RequestDescriptor::get(ops::LLM_CONFIG, "/api/llm/config"))
            .await
    }

    pub async fn save_llm_config(&self, config: &LlmConfig) -> ClientResult<()> {
        let descriptor =
            RequestDescriptor::post(ops::LLM_SAVE_CONFIG, "/api/llm/config/update").json(config)?;
        self.pipeline.call_unit(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::client;
    use crate::http::TransportResponse;
    use crate::models::LlmConfig;
    use serde_json::json;

    #[tokio::test]
    async fn config_round_trips_unknown_fields() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(json!({
            "baseUrl": "https://llm.example.com/v1",
            "apiKey": "sk-test",
            "model": "planner-small",
            "temperature": 0.2
        }));

        let config = api.llm_config().await.unwrap();
        assert_eq!(config.model, "planner-small");

        api.save_llm_config(&config).await.unwrap();
        let sent = transport.last();
        assert_eq!(sent.descriptor.body_field("temperature"), Some(&json!(0.2)));
        assert_eq!(
            sent.descriptor.body_field("baseUrl"),
            Some(&json!("https://llm.example.com/v1"))
        );
    }

    #[tokio::test]
    async fn business_failure_surfaces_message() {
        let (api, transport) = client(Some("abc"));
        transport.reply(TransportResponse::json(200, &json!({"code": 0, "message": "配置无效"})));

        let err = api.save_llm_config(&LlmConfig::default()).await.unwrap_err();

        assert_eq!(err.to_string(), "配置无效");
        assert!(api.is_authenticated());
    }
}
