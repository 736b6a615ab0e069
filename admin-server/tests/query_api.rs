//! 查询引擎集成测试
//!
//! 真实 SQLite 上验证分页、过滤谓词、精简投影与软删除过滤
//! 的组合行为。

use admin_server::db::DbService;
use admin_server::db::models::User;
use admin_server::query::{self, ListParams, ListQuery};
use http::Method;
use sqlx::SqlitePool;

/// 25 个用户: 1=administrator, 2=guest, 3..=25 user{NN};
/// 21..=25 为禁用状态
async fn seeded_pool() -> SqlitePool {
    let pool = DbService::in_memory().await.unwrap().pool;
    for id in 1..=25i64 {
        let username = match id {
            1 => "administrator".to_string(),
            2 => "guest".to_string(),
            n => format!("user{n:02}"),
        };
        let status = if id > 20 { 2 } else { 1 };
        sqlx::query(
            "INSERT INTO users (id, username, password, status, created_at, updated_at) \
             VALUES (?1, ?2, 'not-a-real-hash', ?3, ?1, ?1)",
        )
        .bind(id)
        .bind(&username)
        .bind(status)
        .execute(&pool)
        .await
        .unwrap();
    }
    pool
}

fn parse(params: ListParams) -> ListQuery {
    ListQuery::parse::<User>(&Method::GET, &params).unwrap()
}

fn with_filter(raw: &str) -> ListQuery {
    parse(ListParams {
        params: Some(raw.to_string()),
        ..Default::default()
    })
}

#[tokio::test]
async fn second_page_follows_id_order() {
    let pool = seeded_pool().await;
    let q = parse(ListParams {
        page: Some(2),
        size: Some(10),
        ..Default::default()
    });

    let page = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert_eq!(page.total, Some(25));
    assert_eq!(page.page, 2);
    assert_eq!(page.size, 10);
    let ids: Vec<i64> = page.list.iter().map(|u| u.id).collect();
    assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
}

#[tokio::test]
async fn page_past_the_end_is_empty_but_counted() {
    let pool = seeded_pool().await;
    let q = parse(ListParams {
        page: Some(9),
        size: Some(10),
        ..Default::default()
    });

    let page = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert!(page.list.is_empty());
    assert_eq!(page.total, Some(25));
}

#[tokio::test]
async fn like_filter_matches_substring() {
    let pool = seeded_pool().await;
    let q = with_filter(r#"[{"param":"username","sign":"lk","val":"adm"}]"#);

    let page = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert_eq!(page.total, Some(1));
    assert_eq!(page.list[0].username, "administrator");
}

#[tokio::test]
async fn neq_filter_excludes_exact_match() {
    let pool = seeded_pool().await;
    let q = with_filter(r#"[{"param":"username","sign":"neq","val":"guest"}]"#);

    let page = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert_eq!(page.total, Some(24));
    assert!(page.list.iter().all(|u| u.username != "guest"));
}

#[tokio::test]
async fn in_filter_selects_disabled_users() {
    let pool = seeded_pool().await;
    let q = with_filter(r#"[{"param":"status","sign":"in","val":[2]}]"#);

    let page = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert_eq!(page.total, Some(5));
    let ids: Vec<i64> = page.list.iter().map(|u| u.id).collect();
    assert_eq!(ids, (21..=25).collect::<Vec<i64>>());
}

#[tokio::test]
async fn filters_compose_conjunctively() {
    let pool = seeded_pool().await;
    let q = with_filter(
        r#"[{"param":"status","sign":"eq","val":1},{"param":"username","sign":"lk","val":"user"}]"#,
    );

    // user03..user20: 前缀匹配且启用
    let page = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert_eq!(page.total, Some(18));
    let ids: Vec<i64> = page.list.iter().map(|u| u.id).collect();
    assert_eq!(ids, (3..=20).collect::<Vec<i64>>());
}

#[tokio::test]
async fn complete_mode_returns_everything_without_total() {
    let pool = seeded_pool().await;
    let q = parse(ListParams {
        complete: true,
        ..Default::default()
    });

    let page = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert_eq!(page.list.len(), 25);
    assert!(page.total.is_none());

    // total 整个字段从 JSON 里消失
    let json = serde_json::to_value(&page).unwrap();
    assert!(json.get("total").is_none());
}

#[tokio::test]
async fn simple_projection_exposes_only_option_fields() {
    let pool = seeded_pool().await;
    let q = parse(ListParams {
        size: Some(5),
        simple: true,
        ..Default::default()
    });

    let page = query::fetch_simple::<User>(&pool, &q).await.unwrap();
    assert_eq!(page.list.len(), 5);
    assert_eq!(page.list[0].username, "administrator");

    // 精简行只有 id 和 username, 密码哈希不会出现
    let json = serde_json::to_value(&page.list[0]).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn soft_deleted_rows_disappear_from_every_mode() {
    let pool = seeded_pool().await;
    sqlx::query("UPDATE users SET deleted_at = 1 WHERE id <= 5")
        .execute(&pool)
        .await
        .unwrap();

    let page = query::fetch_page::<User>(&pool, &parse(ListParams::default()))
        .await
        .unwrap();
    assert_eq!(page.total, Some(20));
    assert_eq!(page.list[0].id, 6);

    let q = parse(ListParams {
        complete: true,
        ..Default::default()
    });
    let all = query::fetch_page::<User>(&pool, &q).await.unwrap();
    assert_eq!(all.list.len(), 20);
}

#[tokio::test]
async fn unfilterable_field_is_rejected_before_touching_the_database() {
    let err = ListQuery::parse::<User>(
        &Method::GET,
        &ListParams {
            params: Some(r#"[{"param":"password","sign":"eq","val":"x"}]"#.to_string()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("password"));
}
