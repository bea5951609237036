// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Meeting planning.

use super::{ops, segment, ApiClient};
use crate::error::ClientResult;
use crate::http::{RequestDescriptor, Transport};
use crate::models::{EntityId, Heatmap, HeatmapQuery, NewMeeting};

impl<T: Transport> ApiClient<T> {
    /// Availability of the selected members over a date range.
    pub async fn meeting_heatmap(
        &self,
        org_id: &EntityId,
        query: &HeatmapQuery,
    ) -> ClientResult<Heatmap> {
        let descriptor = RequestDescriptor::post(
            ops::MEETING_HEATMAP,
            format!("/api/heatmap/{}", segment(&org_id.0)),
        )
        .json(query)?;
        self.pipeline.call(descriptor).await
    }

    pub async fn create_meeting(&self, meeting: &NewMeeting) -> ClientResult<()> {
        let descriptor = RequestDescriptor::post(ops::MEETING_CREATE, "/api/meeting/create")
            .json(meeting)?
            .with_body_token();
        self.pipeline.call_unit(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{client, dev_client};
    use crate::models::{EntityId, HeatmapQuery, NewMeeting};
    use chrono::NaiveDate;
    use serde_json::json;

    fn query(members: usize) -> HeatmapQuery {
        HeatmapQuery {
            start_date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 11).unwrap(),
            members: (0..members).map(|i| EntityId::from(i as i64 + 101)).collect(),
        }
    }

    #[tokio::test]
    async fn heatmap_query_is_camel_case() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(json!({"heatmap": [[0, 1, 2]]}));

        let heatmap = api.meeting_heatmap(&EntityId::from(1), &query(2)).await.unwrap();

        assert_eq!(heatmap.heatmap, vec![vec![0, 1, 2]]);
        let sent = transport.last();
        assert_eq!(sent.descriptor.path(), "/api/heatmap/1");
        assert_eq!(sent.descriptor.body_field("startDate"), Some(&json!("2025-05-05")));
        assert_eq!(sent.descriptor.body_field("members"), Some(&json!(["101", "102"])));
    }

    #[tokio::test]
    async fn create_meeting_embeds_token() {
        let (api, transport) = client(Some("abc"));
        let meeting = NewMeeting {
            title: "周会".to_string(),
            start_time: "2025-05-06 10:00".to_string(),
            end_time: "2025-05-06 11:00".to_string(),
            participants: vec![EntityId::from("101")],
            org_id: None,
            description: None,
        };

        api.create_meeting(&meeting).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.descriptor.body_field("token"), Some(&json!("abc")));
        assert_eq!(sent.descriptor.body_field("start_time"), Some(&json!("2025-05-06 10:00")));
    }

    #[tokio::test]
    async fn dev_heatmap_stays_within_member_count() {
        let (api, _transport) = dev_client();

        let heatmap = api.meeting_heatmap(&EntityId::from(1), &query(4)).await.unwrap();

        assert_eq!(heatmap.heatmap.len(), 24);
        assert!(heatmap.heatmap.iter().all(|row| row.len() == 7));
        assert!(heatmap.heatmap.iter().flatten().all(|busy| *busy < 4));
    }
}
