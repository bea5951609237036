// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile and personal schedule.
//!
//! These routes read the credential from the request body, so every
//! descriptor here asks for the body token as well as the bearer header.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use super::{ops, ApiClient};
use crate::error::ClientResult;
use crate::http::{MultipartForm, RequestDescriptor, Transport};
use crate::models::{
    ChangePasswordRequest, CreatedEvent, EntityId, RecurringEvent, ScheduleEvent,
    UpdateUserRequest, UserProfile,
};

/// Wire shape of a new event; the add route names the date `date`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewEventBody<'a> {
    title: &'a str,
    date: NaiveDate,
    start: &'a str,
    end: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    force_create: bool,
}

impl<T: Transport> ApiClient<T> {
    /// Update nickname and contact details. The in-memory profile follows.
    pub async fn update_user_info(&self, request: &UpdateUserRequest) -> ClientResult<()> {
        let descriptor = RequestDescriptor::post(ops::USER_UPDATE, "/api/user/update")
            .json(request)?
            .with_body_token();
        self.pipeline.call_unit(descriptor).await?;

        self.update_profile(|profile| {
            profile.nickname = request.nickname.clone();
            if let Some(phone) = &request.phone {
                profile.phone = Some(phone.clone());
            }
            if let Some(email) = &request.email {
                profile.email = email.clone();
            }
        })
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> ClientResult<()> {
        let descriptor =
            RequestDescriptor::post(ops::USER_CHANGE_PASSWORD, "/api/user/change-password")
                .json(request)?
                .with_body_token();
        self.pipeline.call_unit(descriptor).await
    }

    /// Upload a new avatar image and return its URL.
    pub async fn upload_avatar(
        &self,
        file_name: &str,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> ClientResult<String> {
        let form = MultipartForm::new().file("avatar", file_name, mime, bytes);
        let envelope = self
            .pipeline
            .execute_envelope(
                RequestDescriptor::post(ops::USER_UPLOAD_AVATAR, "/api/user/avatar/upload")
                    .multipart(form)
                    .with_body_token(),
            )
            .await?;

        let url = self.avatar_url(ops::USER_UPLOAD_AVATAR, envelope.field("avatarUrl"))?;
        self.update_profile(|profile| profile.avatar = url.clone())?;
        Ok(url)
    }

    /// Switch the avatar to a QQ profile picture URL.
    pub async fn use_qq_avatar(&self, avatar: &str) -> ClientResult<String> {
        let envelope = self
            .pipeline
            .execute_envelope(
                RequestDescriptor::post(ops::USER_QQ_AVATAR, "/api/user/avatar/qq")
                    .json_value(json!({ "avatar": avatar }))
                    .with_body_token(),
            )
            .await?;

        let url = match envelope.field("avatarUrl") {
            Some(value) => self.avatar_url(ops::USER_QQ_AVATAR, Some(value))?,
            None => avatar.to_string(),
        };
        self.update_profile(|profile| profile.avatar = url.clone())?;
        Ok(url)
    }

    /// The user's whole schedule.
    pub async fn schedule(&self) -> ClientResult<Vec<ScheduleEvent>> {
        let descriptor =
            RequestDescriptor::post(ops::USER_SCHEDULE, "/api/user/schedule").with_body_token();
        self.pipeline.call(descriptor).await
    }

    /// Schedule entries between two dates, inclusive.
    pub async fn schedule_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ClientResult<Vec<ScheduleEvent>> {
        self.pipeline
            .call(
                RequestDescriptor::post(ops::USER_SCHEDULE, "/api/user/schedule")
                    .json_value(json!({ "start_date": start, "end_date": end }))
                    .with_body_token(),
            )
            .await
    }

    /// Add a single event. With `force_create` the backend ignores conflicts.
    pub async fn add_event(
        &self,
        event: &ScheduleEvent,
        force_create: bool,
    ) -> ClientResult<CreatedEvent> {
        let body = NewEventBody {
            title: &event.title,
            date: event.day,
            start: &event.start,
            end: &event.end,
            color: event.color.as_deref(),
            force_create,
        };
        let descriptor = RequestDescriptor::post(ops::USER_SCHEDULE_ADD, "/api/user/schedule/add")
            .json(&body)?
            .with_body_token();
        self.pipeline.call(descriptor).await
    }

    pub async fn edit_event(&self, event: &ScheduleEvent) -> ClientResult<()> {
        let descriptor =
            RequestDescriptor::post(ops::USER_SCHEDULE_EDIT, "/api/user/schedule/edit")
                .json(event)?
                .with_body_token();
        self.pipeline.call_unit(descriptor).await
    }

    pub async fn delete_event(&self, event_id: &EntityId) -> ClientResult<()> {
        self.pipeline
            .call_unit(
                RequestDescriptor::post(ops::USER_SCHEDULE_DELETE, "/api/user/schedule/delete")
                    .json_value(json!({ "eventId": event_id }))
                    .with_body_token(),
            )
            .await
    }

    /// Import a timetable from an `.xlsx`/`.xls` file.
    pub async fn import_schedule_excel(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<()> {
        let form = MultipartForm::new().file("file", file_name, None, bytes);
        self.pipeline
            .call_unit(
                RequestDescriptor::post(
                    ops::USER_SCHEDULE_IMPORT_EXCEL,
                    "/api/user/schedule/import/excel",
                )
                .multipart(form)
                .with_body_token(),
            )
            .await
    }

    /// Import a timetable from a school's academic system.
    pub async fn import_schedule_school(&self, school: &str) -> ClientResult<()> {
        self.pipeline
            .call_unit(
                RequestDescriptor::post(
                    ops::USER_SCHEDULE_IMPORT_SCHOOL,
                    "/api/user/schedule/import/school",
                )
                .json_value(json!({ "school": school }))
                .with_body_token(),
            )
            .await
    }

    pub async fn add_recurring_event(&self, event: &RecurringEvent) -> ClientResult<()> {
        let descriptor = RequestDescriptor::post(
            ops::USER_SCHEDULE_ADD_RECURRING,
            "/api/user/schedule/add/recurring",
        )
        .json(event)?
        .with_body_token();
        self.pipeline.call_unit(descriptor).await
    }

    fn avatar_url(&self, operation: &str, value: Option<&Value>) -> ClientResult<String> {
        self.pipeline
            .decode(operation, value.cloned().unwrap_or(Value::Null))
    }

    /// Apply a change to the cached profile of the current session.
    fn update_profile(&self, apply: impl FnOnce(&mut UserProfile)) -> ClientResult<()> {
        let mut session = self.session().get();
        if !session.is_authenticated() {
            return Ok(());
        }
        apply(session.profile.get_or_insert_with(UserProfile::default));
        self.session().set(session)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{client, dev_client};
    use crate::http::{RequestBody, TransportResponse, AUTHORIZATION};
    use crate::models::{EntityId, Frequency, RecurringEvent, ScheduleEvent, UpdateUserRequest};
    use chrono::NaiveDate;
    use serde_json::json;

    #[tokio::test]
    async fn schedule_carries_token_in_header_and_body() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(json!([
            {"id": 1, "title": "数学课", "day": "2025-04-26", "start": "08:00", "end": "09:30"}
        ]));

        let events = api.schedule().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "数学课");
        let sent = transport.last();
        assert_eq!(sent.descriptor.header_value(AUTHORIZATION), Some("Bearer abc"));
        assert_eq!(sent.descriptor.body_field("token"), Some(&json!("abc")));
    }

    #[tokio::test]
    async fn add_event_sends_date_field() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(json!({"id": 42, "title": "组会"}));
        let event = ScheduleEvent {
            id: None,
            title: "组会".to_string(),
            day: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            start: "14:00".to_string(),
            end: "15:00".to_string(),
            color: None,
        };

        let created = api.add_event(&event, true).await.unwrap();

        assert_eq!(created.id.0, "42");
        let sent = transport.last();
        assert_eq!(sent.descriptor.body_field("date"), Some(&json!("2025-05-01")));
        assert_eq!(sent.descriptor.body_field("forceCreate"), Some(&json!(true)));
        assert_eq!(sent.descriptor.body_field("color"), None);
    }

    #[tokio::test]
    async fn recurring_event_uses_camel_case() {
        let (api, transport) = client(Some("abc"));
        let event = RecurringEvent {
            title: "晨跑".to_string(),
            start: "07:00".to_string(),
            end: "07:30".to_string(),
            frequency: Frequency::Weekly,
            custom_dates: Vec::new(),
            color: None,
            repeat_count: Some(10),
            force_create: false,
        };

        api.add_recurring_event(&event).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.descriptor.body_field("frequency"), Some(&json!("weekly")));
        assert_eq!(sent.descriptor.body_field("repeatCount"), Some(&json!(10)));
    }

    #[tokio::test]
    async fn avatar_upload_is_multipart_with_token() {
        let (api, transport) = client(Some("abc"));
        transport.reply(TransportResponse::json(
            200,
            &json!({"code": 200, "message": "头像上传成功", "avatarUrl": "https://cdn/a.png"}),
        ));

        let url = api
            .upload_avatar("a.png", Some("image/png"), vec![0x89, 0x50])
            .await
            .unwrap();

        assert_eq!(url, "https://cdn/a.png");
        match transport.last().descriptor.body() {
            RequestBody::Multipart(form) => {
                assert_eq!(form.text.get("token").map(String::as_str), Some("abc"));
                assert_eq!(form.files[0].field, "avatar");
            }
            other => panic!("unexpected body {other:?}"),
        }
        let profile = api.session().get().profile.unwrap();
        assert_eq!(profile.avatar, "https://cdn/a.png");
    }

    #[tokio::test]
    async fn profile_follows_update() {
        let (api, _transport) = client(Some("abc"));
        let request = UpdateUserRequest {
            nickname: "新昵称".to_string(),
            phone: None,
            email: Some("new@example.com".to_string()),
        };

        api.update_user_info(&request).await.unwrap();

        let profile = api.session().get().profile.unwrap();
        assert_eq!(profile.nickname, "新昵称");
        assert_eq!(profile.email, "new@example.com");
        assert_eq!(api.session().token().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn schedule_without_session_is_rejected_locally() {
        let (api, transport) = client(None);
        let err = api.schedule().await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn dev_mode_schedule_comes_from_fixtures() {
        let (api, transport) = dev_client();

        let events = api.schedule().await.unwrap();
        api.delete_event(&EntityId::from("3")).await.unwrap();

        assert_eq!(events.len(), 8);
        assert_eq!(transport.count(), 0);
    }
}
