// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Organizations: listing, administration, membership and invitations.

use serde_json::{json, Value};

use super::{ops, segment, ApiClient};
use crate::error::ClientResult;
use crate::http::{RequestDescriptor, Transport};
use crate::models::{
    EntityId, Heatmap, MeetingCandidate, OrgDetail, OrgSummary, UserSummary,
};

impl<T: Transport> ApiClient<T> {
    /// Organizations the user belongs to.
    ///
    /// This route authenticates by the token in its body only, so the call
    /// opts out of session credentials and embeds the token itself.
    pub async fn user_orgs(&self) -> ClientResult<Vec<OrgSummary>> {
        let token = self.session().token().unwrap_or_default();
        self.pipeline
            .call(
                RequestDescriptor::post(ops::ORG_USER_ORGS, "/api/user/orglist")
                    .json_value(json!({ "token": token }))
                    .skip_auth(),
            )
            .await
    }

    pub async fn org_members(&self, org_id: &EntityId) -> ClientResult<Vec<MeetingCandidate>> {
        self.pipeline
            .call(RequestDescriptor::get(
                ops::ORG_MEMBERS,
                format!("/api/organization/{}/members", segment(&org_id.0)),
            ))
            .await
    }

    /// Busy-count heatmap over the organization's default window.
    pub async fn org_heatmap(&self, org_id: &EntityId) -> ClientResult<Heatmap> {
        self.pipeline
            .call(RequestDescriptor::get(
                ops::ORG_HEATMAP,
                format!("/api/heatmap/{}", segment(&org_id.0)),
            ))
            .await
    }

    pub async fn org_detail(&self, org_id: &EntityId) -> ClientResult<OrgDetail> {
        self.pipeline
            .call(RequestDescriptor::get(
                ops::ORG_DETAIL,
                format!("/api/org/{}", segment(&org_id.0)),
            ))
            .await
    }

    /// Create an organization, optionally inviting initial members.
    pub async fn create_org(&self, name: &str, members: &[EntityId]) -> ClientResult<OrgDetail> {
        self.pipeline
            .call(
                RequestDescriptor::post(ops::ORG_CREATE, "/api/org")
                    .json_value(json!({ "name": name, "members": members }))
                    .with_body_token(),
            )
            .await
    }

    pub async fn update_org_name(&self, org_id: &EntityId, name: &str) -> ClientResult<()> {
        let path = format!("/api/org/{}", segment(&org_id.0));
        self.pipeline
            .call_unit(
                RequestDescriptor::put(ops::ORG_UPDATE_NAME, path)
                    .json_value(json!({ "name": name }))
                    .with_body_token(),
            )
            .await
    }

    pub async fn delete_org(&self, org_id: &EntityId) -> ClientResult<()> {
        let path = format!("/api/org/{}", segment(&org_id.0));
        self.pipeline
            .call_unit(RequestDescriptor::delete(ops::ORG_DELETE, path).with_body_token())
            .await
    }

    /// Replace the organization's admin set.
    pub async fn set_org_admins(
        &self,
        org_id: &EntityId,
        admin_ids: &[EntityId],
    ) -> ClientResult<()> {
        self.pipeline
            .call_unit(
                RequestDescriptor::post(
                    ops::ORG_SET_ADMINS,
                    format!("/api/org/{}/admins", segment(&org_id.0)),
                )
                .json_value(json!({ "adminIds": admin_ids }))
                .with_body_token(),
            )
            .await
    }

    /// Find users by name or id fragment.
    pub async fn search_users(&self, query: &str) -> ClientResult<Vec<UserSummary>> {
        let descriptor =
            RequestDescriptor::get(ops::ORG_SEARCH_USERS, "/api/users/search").query("q", query);
        self.pipeline.call(descriptor).await
    }

    pub async fn invite_member(&self, org_id: &EntityId, user_id: &EntityId) -> ClientResult<()> {
        self.pipeline
            .call_unit(
                RequestDescriptor::post(
                    ops::ORG_INVITE,
                    format!("/api/org/{}/invite", segment(&org_id.0)),
                )
                .json_value(json!({ "userId": user_id }))
                .with_body_token(),
            )
            .await
    }

    /// Look an organization up by id. `None` when it does not exist.
    pub async fn search_org(&self, org_id: &EntityId) -> ClientResult<Option<OrgDetail>> {
        let descriptor =
            RequestDescriptor::get(ops::ORG_SEARCH, "/api/org/search").query("id", &org_id.0);
        let payload = self.pipeline.execute(descriptor).await?;
        if payload == Value::Null {
            return Ok(None);
        }
        self.pipeline.decode(ops::ORG_SEARCH, payload).map(Some)
    }

    /// Ask to join an organization; admins review the request.
    pub async fn apply_join_org(&self, org_id: &EntityId, message: &str) -> ClientResult<()> {
        self.pipeline
            .call_unit(
                RequestDescriptor::post(ops::ORG_JOIN_REQUEST, "/api/org/join-request")
                    .json_value(json!({ "orgId": org_id, "message": message }))
                    .with_body_token(),
            )
            .await
    }

    pub async fn accept_invitation(&self, invitation_id: &EntityId) -> ClientResult<()> {
        self.answer_invitation(ops::ORG_ACCEPT_INVITATION, invitation_id, "accept")
            .await
    }

    pub async fn reject_invitation(&self, invitation_id: &EntityId) -> ClientResult<()> {
        self.answer_invitation(ops::ORG_REJECT_INVITATION, invitation_id, "reject")
            .await
    }

    async fn answer_invitation(
        &self,
        operation: &'static str,
        invitation_id: &EntityId,
        action: &str,
    ) -> ClientResult<()> {
        self.pipeline
            .call_unit(
                RequestDescriptor::post(
                    operation,
                    format!("/api/invitation/{}/{action}", segment(&invitation_id.0)),
                )
                .with_body_token(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{client, dev_client};
    use crate::http::{Method, AUTHORIZATION};
    use crate::models::{EntityId, MemberRole};
    use serde_json::json;

    #[tokio::test]
    async fn user_orgs_skips_session_credentials() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(json!([{"id": 1, "name": "开发组", "members": 12}]));

        let orgs = api.user_orgs().await.unwrap();

        assert_eq!(orgs[0].members, 12);
        let sent = transport.last();
        assert_eq!(sent.descriptor.header_value(AUTHORIZATION), None);
        assert_eq!(sent.descriptor.body_field("token"), Some(&json!("abc")));
    }

    #[tokio::test]
    async fn detail_decodes_roles() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(json!({
            "id": "org1",
            "name": "数据科学研究组",
            "members": [
                {"id": "u1", "name": "张教授", "role": "creator", "avatarUrl": null},
                {"id": "u4", "name": "陈同学", "role": "", "avatarUrl": null}
            ]
        }));

        let detail = api.org_detail(&EntityId::from("org1")).await.unwrap();

        assert_eq!(detail.members[0].role, MemberRole::Creator);
        assert_eq!(detail.members[1].role, MemberRole::Member);
        let sent = transport.last();
        assert_eq!(sent.descriptor.method(), Method::Get);
        assert_eq!(sent.descriptor.path(), "/api/org/org1");
        assert_eq!(sent.descriptor.header_value(AUTHORIZATION), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn search_users_uses_query_string() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(json!([{"id": "u21", "name": "李四", "avatarUrl": null}]));

        let users = api.search_users("李").await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(
            transport.last().descriptor.query_pairs(),
            &[("q".to_string(), "李".to_string())]
        );
    }

    #[tokio::test]
    async fn search_org_maps_null_to_none() {
        let (api, transport) = client(Some("abc"));
        transport.reply_data(serde_json::Value::Null);

        assert_eq!(api.search_org(&EntityId::from("org9")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn invitation_answers_hit_action_paths() {
        let (api, transport) = client(Some("abc"));

        api.accept_invitation(&EntityId::from("inv1")).await.unwrap();
        assert_eq!(transport.last().descriptor.path(), "/api/invitation/inv1/accept");

        api.reject_invitation(&EntityId::from("inv2")).await.unwrap();
        assert_eq!(transport.last().descriptor.path(), "/api/invitation/inv2/reject");
    }

    #[tokio::test]
    async fn admins_are_sent_as_ids() {
        let (api, transport) = client(Some("abc"));

        api.set_org_admins(&EntityId::from("org1"), &[EntityId::from("u2"), EntityId::from("u3")])
            .await
            .unwrap();

        let sent = transport.last();
        assert_eq!(sent.descriptor.path(), "/api/org/org1/admins");
        assert_eq!(sent.descriptor.body_field("adminIds"), Some(&json!(["u2", "u3"])));
    }

    #[tokio::test]
    async fn dev_mode_org_calls_use_fixtures() {
        let (api, transport) = dev_client();

        let orgs = api.user_orgs().await.unwrap();
        let found = api.search_org(&EntityId::from("org2")).await.unwrap();
        let missing = api.search_org(&EntityId::from("nope")).await.unwrap();
        let heatmap = api.org_heatmap(&EntityId::from(1)).await.unwrap();

        assert_eq!(orgs.len(), 3);
        assert_eq!(found.map(|org| org.name), Some("软件开发小组".to_string()));
        assert!(missing.is_none());
        assert_eq!(heatmap.heatmap.len(), 24);
        assert_eq!(heatmap.heatmap[0].len(), 30);
        assert_eq!(transport.count(), 0);
    }
}
