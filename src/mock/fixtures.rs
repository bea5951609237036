// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canned payloads served in dev mode.

use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::MockRegistry;
use crate::api::ops;
use crate::http::RequestDescriptor;

const INSTANT: Duration = Duration::ZERO;
const READ_DELAY: Duration = Duration::from_millis(300);
const WRITE_DELAY: Duration = Duration::from_millis(400);
const SLOW_WRITE_DELAY: Duration = Duration::from_millis(500);

/// Heatmap grid size: 24 hourly slots by 30 days.
const HEATMAP_ROWS: usize = 24;
const HEATMAP_COLS: usize = 30;

pub fn default_registry() -> MockRegistry {
    let mut registry = MockRegistry::empty();

    // ---- schedule ----
    registry.register_static(ops::USER_SCHEDULE, INSTANT, schedule_events());
    registry.register(ops::USER_SCHEDULE_ADD, INSTANT, |_| {
        json!({ "id": (Uuid::new_v4().as_u128() % 10_000) as u64 })
    });
    for op in [
        ops::USER_SCHEDULE_EDIT,
        ops::USER_SCHEDULE_DELETE,
        ops::USER_SCHEDULE_IMPORT_EXCEL,
        ops::USER_SCHEDULE_IMPORT_SCHOOL,
        ops::USER_SCHEDULE_ADD_RECURRING,
    ] {
        registry.register_static(op, INSTANT, Value::Null);
    }

    // ---- organizations ----
    registry.register_static(
        ops::ORG_USER_ORGS,
        INSTANT,
        json!([
            { "id": 1, "name": "开发组", "members": 12 },
            { "id": 2, "name": "唐高祖", "members": 8 },
            { "id": 3, "name": "电阻", "members": 8_888_888 }
        ]),
    );
    registry.register_static(
        ops::ORG_MEMBERS,
        INSTANT,
        json!([
            { "uid": 101, "name": "张三" },
            { "uid": 102, "name": "李四" },
            { "uid": 103, "name": "王五" },
            { "uid": 104, "name": "赵六" }
        ]),
    );
    registry.register(ops::ORG_HEATMAP, INSTANT, |_| {
        json!({ "heatmap": synthetic_heatmap(HEATMAP_ROWS, HEATMAP_COLS, 300) })
    });
    registry.register(ops::ORG_DETAIL, READ_DELAY, |descriptor| {
        let id = descriptor
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        json!({
            "id": id,
            "name": "数据科学研究组",
            "members": [
                { "id": "u1", "name": "张教授", "role": "creator", "avatarUrl": null },
                { "id": "u2", "name": "李研究员", "role": "admin", "avatarUrl": null },
                { "id": "u3", "name": "王博士", "role": "admin", "avatarUrl": null },
                { "id": "u4", "name": "陈同学", "role": "", "avatarUrl": null },
                { "id": "u5", "name": "林同学", "role": "", "avatarUrl": null }
            ]
        })
    });
    registry.register(ops::ORG_CREATE, SLOW_WRITE_DELAY, |descriptor| {
        let name = descriptor
            .body_field("name")
            .cloned()
            .unwrap_or(Value::Null);
        let mut members = vec![json!({
            "id": "u1", "name": "当前用户", "role": "creator", "avatarUrl": null
        })];
        if let Some(Value::Array(ids)) = descriptor.body_field("members") {
            members.extend(ids.iter().map(|id| {
                let id = id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string());
                json!({ "id": id, "name": format!("用户{id}"), "role": "", "avatarUrl": null })
            }));
        }
        json!({
            "id": format!("org{}", Utc::now().timestamp_millis()),
            "name": name,
            "members": members
        })
    });
    registry.register_static(ops::ORG_UPDATE_NAME, READ_DELAY, Value::Null);
    registry.register_static(ops::ORG_DELETE, SLOW_WRITE_DELAY, Value::Null);
    registry.register_static(ops::ORG_SET_ADMINS, WRITE_DELAY, Value::Null);
    registry.register(ops::ORG_SEARCH_USERS, READ_DELAY, |descriptor| {
        let query = query_param(descriptor, "q").unwrap_or_default();
        let users: Vec<Value> = [
            ("u20", "张三"),
            ("u21", "李四"),
            ("u22", "王五"),
            ("u23", "赵六"),
            ("u24", "孙七"),
        ]
        .into_iter()
        .filter(|(id, name)| name.contains(query) || id.contains(query))
        .map(|(id, name)| json!({ "id": id, "name": name, "avatarUrl": null }))
        .collect();
        Value::Array(users)
    });
    registry.register_static(ops::ORG_INVITE, WRITE_DELAY, Value::Null);
    registry.register(ops::ORG_SEARCH, READ_DELAY, |descriptor| {
        let wanted = query_param(descriptor, "id").unwrap_or_default();
        let orgs = [
            json!({
                "id": "org1",
                "name": "数据科学研究组",
                "members": [
                    { "id": "u1", "name": "张教授", "role": "creator", "avatarUrl": null },
                    { "id": "u2", "name": "李研究员", "role": "admin", "avatarUrl": null }
                ]
            }),
            json!({
                "id": "org2",
                "name": "软件开发小组",
                "members": [
                    { "id": "u6", "name": "刘组长", "role": "creator", "avatarUrl": null },
                    { "id": "u7", "name": "杨开发", "role": "admin", "avatarUrl": null }
                ]
            }),
        ];
        orgs.into_iter()
            .find(|org| org["id"] == wanted)
            .unwrap_or(Value::Null)
    });
    registry.register_static(ops::ORG_JOIN_REQUEST, SLOW_WRITE_DELAY, Value::Null);
    registry.register_static(ops::ORG_ACCEPT_INVITATION, WRITE_DELAY, Value::Null);
    registry.register_static(ops::ORG_REJECT_INVITATION, READ_DELAY, Value::Null);

    // ---- meetings ----
    registry.register(ops::MEETING_HEATMAP, INSTANT, |descriptor| {
        let members = descriptor
            .body_field("members")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0) as u32;
        json!({ "heatmap": synthetic_heatmap(HEATMAP_ROWS, 7, members.saturating_sub(1)) })
    });
    registry.register_static(ops::MEETING_CREATE, INSTANT, Value::Null);

    registry
}

fn query_param<'a>(descriptor: &'a RequestDescriptor, name: &str) -> Option<&'a str> {
    descriptor
        .query_pairs()
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn schedule_events() -> Value {
    json!([
        { "id": 1, "title": "数学课", "day": "2025-04-26", "start": "08:00", "end": "09:30", "color": "#F56C6C" },
        { "id": 2, "title": "干活", "day": "2025-04-27", "start": "10:00", "end": "11:30", "color": "#67C23A" },
        { "id": 3, "title": "干活", "day": "2025-04-28", "start": "13:00", "end": "15:00" },
        { "id": 4, "title": "起义", "day": "2025-04-29", "start": "16:00", "end": "18:00" },
        { "id": 5, "title": "上课", "day": "2025-04-30", "start": "08:00", "end": "09:30" },
        { "id": 6, "title": "干活", "day": "2025-05-06", "start": "10:00", "end": "11:30" },
        { "id": 7, "title": "干活", "day": "2025-05-08", "start": "13:00", "end": "15:00" },
        { "id": 8, "title": "上课", "day": "2025-05-16", "start": "10:00", "end": "18:00", "color": "#86C23A" }
    ])
}

/// Deterministic busy-count grid with values in `0..=max`.
fn synthetic_heatmap(rows: usize, cols: usize, max: u32) -> Vec<Vec<u32>> {
    let modulus = max.saturating_add(1) as usize;
    (0..rows)
        .map(|row| (0..cols).map(|col| ((row * 7 + col * 13) % modulus) as u32).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrgDetail, OrgSummary, ScheduleEvent, UserSummary};

    #[test]
    fn defaults_cover_mocked_operations() {
        let registry = default_registry();
        for op in [ops::USER_SCHEDULE, ops::ORG_USER_ORGS, ops::ORG_DETAIL, ops::MEETING_CREATE] {
            assert!(registry.contains(op), "missing mock for {op}");
        }
        assert!(!registry.contains(ops::AUTH_LOGIN));
        assert!(!registry.contains(ops::LLM_CONFIG));
    }

    #[test]
    fn canned_payloads_decode_into_models() {
        let registry = default_registry();
        let generate = |op: &str, descriptor: RequestDescriptor| {
            (registry.get(op).unwrap().generate)(&descriptor)
        };

        let events: Vec<ScheduleEvent> = serde_json::from_value(generate(
            ops::USER_SCHEDULE,
            RequestDescriptor::post(ops::USER_SCHEDULE, "/api/user/schedule"),
        ))
        .unwrap();
        assert_eq!(events.len(), 8);

        let orgs: Vec<OrgSummary> = serde_json::from_value(generate(
            ops::ORG_USER_ORGS,
            RequestDescriptor::post(ops::ORG_USER_ORGS, "/api/user/orglist"),
        ))
        .unwrap();
        assert_eq!(orgs[0].name, "开发组");

        let detail: OrgDetail = serde_json::from_value(generate(
            ops::ORG_DETAIL,
            RequestDescriptor::get(ops::ORG_DETAIL, "/api/org/42"),
        ))
        .unwrap();
        assert_eq!(detail.id.0, "42");
        assert_eq!(detail.members.len(), 5);
    }

    #[test]
    fn search_users_filters_by_query() {
        let registry = default_registry();
        let descriptor = RequestDescriptor::get(ops::ORG_SEARCH_USERS, "/api/users/search")
            .query("q", "李");
        let entry = registry.get(ops::ORG_SEARCH_USERS).unwrap();
        let users: Vec<UserSummary> =
            serde_json::from_value((entry.generate)(&descriptor)).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id.0, "u21");
    }

    #[test]
    fn search_org_returns_null_when_unknown() {
        let registry = default_registry();
        let descriptor =
            RequestDescriptor::get(ops::ORG_SEARCH, "/api/org/search").query("id", "org9");
        assert_eq!((registry.get(ops::ORG_SEARCH).unwrap().generate)(&descriptor), Value::Null);
    }

    #[test]
    fn create_org_echoes_members() {
        let registry = default_registry();
        let descriptor = RequestDescriptor::post(ops::ORG_CREATE, "/api/org")
            .json_value(json!({"name": "新组织", "members": ["u9"]}));
        let org: OrgDetail =
            serde_json::from_value((registry.get(ops::ORG_CREATE).unwrap().generate)(&descriptor))
                .unwrap();
        assert_eq!(org.name, "新组织");
        assert_eq!(org.members.len(), 2);
        assert!(org.id.0.starts_with("org"));
    }

    #[test]
    fn heatmap_values_stay_in_range() {
        let grid = synthetic_heatmap(24, 7, 3);
        assert_eq!(grid.len(), 24);
        assert!(grid.iter().all(|row| row.len() == 7 && row.iter().all(|v| *v <= 3)));
    }
}
