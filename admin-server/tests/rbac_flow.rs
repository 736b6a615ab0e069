//! RBAC 核心流程集成测试
//!
//! 内存 SQLite 上验证: 关联整组替换的原子性、角色/用户删除的
//! 清理语义、权限树的级联删除与父引用校验。

use admin_server::db::models::{
    PermissionCreate, PermissionKind, RoleCreate, RolePermissionLink, Status, UserCreate,
    UserUpdate,
};
use admin_server::db::repository::{permission, role, user};
use admin_server::db::{DbService, ensure_default_admin};
use admin_server::rbac::tree;
use admin_server::utils::AppError;
use sqlx::SqlitePool;

/// 新建内存库 (迁移 + 种子已应用)
async fn test_pool() -> SqlitePool {
    DbService::in_memory().await.unwrap().pool
}

fn role_payload(name: &str, code: &str) -> RoleCreate {
    RoleCreate {
        name: name.to_string(),
        code: code.to_string(),
        remark: None,
        status: None,
    }
}

fn menu_payload(name: &str, code: &str, parent_id: i64) -> PermissionCreate {
    PermissionCreate {
        name: name.to_string(),
        kind: PermissionKind::Menu,
        path: Some(format!("/{code}")),
        code: code.to_string(),
        component: None,
        icon: None,
        sort: None,
        parent_id,
        remark: None,
        status: None,
    }
}

fn button_payload(name: &str, code: &str, parent_id: i64) -> PermissionCreate {
    PermissionCreate {
        kind: PermissionKind::Button,
        path: None,
        ..menu_payload(name, code, parent_id)
    }
}

async fn grant_count(pool: &SqlitePool, role_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM role_permissions WHERE role_id = ?")
        .bind(role_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn replace_role_permissions_and_read_back() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();

    role::replace_permissions(&pool, role.id, &[1, 2, 5]).await.unwrap();
    assert_eq!(role::permission_ids(&pool, role.id).await.unwrap(), vec![1, 2, 5]);

    // 关联表里恰好是这三行
    let rows = sqlx::query_as::<_, RolePermissionLink>(
        "SELECT role_id, permission_id FROM role_permissions WHERE role_id = ? ORDER BY permission_id",
    )
    .bind(role.id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.role_id == role.id));

    // 再次替换为另一组, 旧关联整体被换掉
    role::replace_permissions(&pool, role.id, &[3, 8]).await.unwrap();
    assert_eq!(role::permission_ids(&pool, role.id).await.unwrap(), vec![3, 8]);
}

#[tokio::test]
async fn invalid_permission_id_fails_without_touching_existing_links() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();
    role::replace_permissions(&pool, role.id, &[1, 2]).await.unwrap();

    // 含不存在 id 的替换整体失败
    let err = role::replace_permissions(&pool, role.id, &[1, 999_999])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    // 已有关联原样保留
    assert_eq!(role::permission_ids(&pool, role.id).await.unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn disabled_permission_cannot_be_granted() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();

    // 禁用 5 (user:create) 后授权包含它的集合被拒绝
    sqlx::query("UPDATE permissions SET status = 2 WHERE id = 5")
        .execute(&pool)
        .await
        .unwrap();

    let err = role::replace_permissions(&pool, role.id, &[1, 5]).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
    assert!(role::permission_ids(&pool, role.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_ids_in_replacement_are_rejected() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();

    let err = role::replace_permissions(&pool, role.id, &[1, 1]).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
}

#[tokio::test]
async fn empty_replacement_clears_and_is_idempotent() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();
    role::replace_permissions(&pool, role.id, &[1, 2]).await.unwrap();

    role::replace_permissions(&pool, role.id, &[]).await.unwrap();
    assert!(role::permission_ids(&pool, role.id).await.unwrap().is_empty());

    // 对空集合再清一次, 结果不变
    role::replace_permissions(&pool, role.id, &[]).await.unwrap();
    assert!(role::permission_ids(&pool, role.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn sequential_replacements_last_writer_wins() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();

    role::replace_permissions(&pool, role.id, &[1, 2]).await.unwrap();
    role::replace_permissions(&pool, role.id, &[3, 4]).await.unwrap();
    assert_eq!(role::permission_ids(&pool, role.id).await.unwrap(), vec![3, 4]);
}

#[tokio::test]
async fn user_create_assigns_roles_atomically() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();

    let created = user::create(
        &pool,
        UserCreate {
            username: "alice".to_string(),
            password: "unused".to_string(),
            nickname: None,
            email: None,
            phone: None,
            status: None,
            role_ids: vec![role.id],
        },
        "fake-hash".to_string(),
    )
    .await
    .unwrap();
    assert_eq!(user::role_ids_of(&pool, created.id).await.unwrap(), vec![role.id]);

    // 角色 id 不合法时用户行也不落库
    let err = user::create(
        &pool,
        UserCreate {
            username: "bob".to_string(),
            password: "unused".to_string(),
            nickname: None,
            email: None,
            phone: None,
            status: None,
            role_ids: vec![999_999],
        },
        "fake-hash".to_string(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
    assert!(user::find_by_username(&pool, "bob").await.unwrap().is_none());
}

#[tokio::test]
async fn user_update_replaces_role_set() {
    let pool = test_pool().await;
    let ops = role::create(&pool, role_payload("Operator", "OPERATOR")).await.unwrap();
    let aud = role::create(&pool, role_payload("Auditor", "AUDITOR")).await.unwrap();

    let created = user::create(
        &pool,
        UserCreate {
            username: "alice".to_string(),
            password: "unused".to_string(),
            nickname: None,
            email: None,
            phone: None,
            status: None,
            role_ids: vec![ops.id],
        },
        "fake-hash".to_string(),
    )
    .await
    .unwrap();

    // role_ids = None 不动角色
    user::update(
        &pool,
        created.id,
        UserUpdate {
            nickname: Some("Alice".to_string()),
            email: None,
            phone: None,
            status: None,
            role_ids: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(user::role_ids_of(&pool, created.id).await.unwrap(), vec![ops.id]);

    // Some(..) 整组替换
    user::update(
        &pool,
        created.id,
        UserUpdate {
            nickname: None,
            email: None,
            phone: None,
            status: None,
            role_ids: Some(vec![aud.id]),
        },
    )
    .await
    .unwrap();
    assert_eq!(user::role_ids_of(&pool, created.id).await.unwrap(), vec![aud.id]);

    // Some(空) 清空
    user::update(
        &pool,
        created.id,
        UserUpdate {
            nickname: None,
            email: None,
            phone: None,
            status: None,
            role_ids: Some(Vec::new()),
        },
    )
    .await
    .unwrap();
    assert!(user::role_ids_of(&pool, created.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn role_delete_clears_grants_and_hides_from_users() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();
    role::replace_permissions(&pool, role.id, &[1, 2]).await.unwrap();

    let created = user::create(
        &pool,
        UserCreate {
            username: "alice".to_string(),
            password: "unused".to_string(),
            nickname: None,
            email: None,
            phone: None,
            status: None,
            role_ids: vec![role.id],
        },
        "fake-hash".to_string(),
    )
    .await
    .unwrap();

    role::delete(&pool, role.id).await.unwrap();

    // 角色不可见, 授权行物理清空
    assert!(role::find_by_id(&pool, role.id).await.unwrap().is_none());
    assert_eq!(grant_count(&pool, role.id).await, 0);

    // 用户侧残留的 user_roles 行不再产生角色和权限
    assert!(user::roles_of(&pool, created.id).await.unwrap().is_empty());
    assert!(user::permission_codes(&pool, created.id).await.unwrap().is_empty());

    // 删除后同码角色可以重建 (唯一索引只覆盖存活行)
    role::create(&pool, role_payload("Operator", "OPERATOR")).await.unwrap();
}

#[tokio::test]
async fn deleting_missing_role_reports_not_found() {
    let pool = test_pool().await;
    let err = role::delete(&pool, 424_242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn permission_delete_cascades_to_descendants_and_grants() {
    let pool = test_pool().await;

    // 种子菜单 2 (User Management) 下挂按钮 5/6/7, 全部授权给角色 1
    let before = grant_count(&pool, 1).await;
    let deleted = permission::delete_tree(&pool, 2).await.unwrap();
    let mut deleted_sorted = deleted.clone();
    deleted_sorted.sort_unstable();
    assert_eq!(deleted_sorted, vec![2, 5, 6, 7]);

    // 软删后全部不可见
    for id in &deleted {
        assert!(permission::find_by_id(&pool, *id).await.unwrap().is_none());
    }
    // 对应授权行物理删除
    assert_eq!(grant_count(&pool, 1).await, before - 4);

    // 树里不再有 User Management 分支
    let forest = tree::build_tree(permission::find_all(&pool).await.unwrap(), tree::ROOT_PARENT);
    let system = &forest[0];
    let child_ids: Vec<i64> = system
        .children
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(child_ids, vec![3, 4]);
}

#[tokio::test]
async fn seeded_permissions_assemble_into_expected_tree() {
    let pool = test_pool().await;
    let forest = tree::build_tree(permission::find_all(&pool).await.unwrap(), tree::ROOT_PARENT);

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].code, "system");
    let level1: Vec<&str> = forest[0]
        .children
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(level1, vec!["system:user", "system:role", "system:perm"]);

    // 按钮挂在对应菜单下, 按 sort 排列
    let role_menu = &forest[0].children.as_ref().unwrap()[1];
    let buttons: Vec<&str> = role_menu
        .children
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(buttons, vec!["role:create", "role:update", "role:grant", "role:delete"]);
}

#[tokio::test]
async fn permission_parent_must_be_live_menu() {
    let pool = test_pool().await;

    // 不存在的父节点
    let err = permission::create(&pool, menu_payload("Ghost", "ghost", 999_999))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    // button 不能作为父节点 (5 是按钮)
    let err = permission::create(&pool, button_payload("Bad", "bad:button", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // 软删除的父节点同样拒绝
    permission::delete_tree(&pool, 2).await.unwrap();
    let err = permission::create(&pool, button_payload("Orphan", "orphan:x", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));
}

#[tokio::test]
async fn permission_cannot_become_its_own_parent() {
    let pool = test_pool().await;
    let created = permission::create(&pool, menu_payload("Reports", "reports", 0))
        .await
        .unwrap();

    let err = permission::update(
        &pool,
        created.id,
        admin_server::db::models::PermissionUpdate {
            name: None,
            kind: None,
            path: None,
            code: None,
            component: None,
            icon: None,
            sort: None,
            parent_id: Some(created.id),
            remark: None,
            status: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn default_admin_bootstrap_grants_everything() {
    let pool = test_pool().await;
    ensure_default_admin(&pool).await.unwrap();

    let admin = user::find_by_username(&pool, "admin").await.unwrap().unwrap();
    assert_eq!(admin.status, Status::Enabled);

    let roles = user::roles_of(&pool, admin.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].code, "ADMIN");

    let codes = user::permission_codes(&pool, admin.id).await.unwrap();
    assert!(codes.iter().any(|c| c == "user:create"));
    assert!(codes.iter().any(|c| c == "role:grant"));
    assert!(codes.iter().any(|c| c == "perm:delete"));

    // 再跑一次不会重复创建
    ensure_default_admin(&pool).await.unwrap();
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE username = 'admin' AND deleted_at IS NULL",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn disabled_role_contributes_no_permission_codes() {
    let pool = test_pool().await;
    let role = role::create(&pool, role_payload("Operator", "OPERATOR"))
        .await
        .unwrap();
    role::replace_permissions(&pool, role.id, &[5, 6]).await.unwrap();

    let created = user::create(
        &pool,
        UserCreate {
            username: "alice".to_string(),
            password: "unused".to_string(),
            nickname: None,
            email: None,
            phone: None,
            status: None,
            role_ids: vec![role.id],
        },
        "fake-hash".to_string(),
    )
    .await
    .unwrap();
    assert_eq!(user::permission_codes(&pool, created.id).await.unwrap().len(), 2);

    // 禁用角色后权限码立即失效
    role::update(
        &pool,
        role.id,
        admin_server::db::models::RoleUpdate {
            name: None,
            code: None,
            remark: None,
            status: Some(Status::Disabled),
        },
    )
    .await
    .unwrap();
    assert!(user::permission_codes(&pool, created.id).await.unwrap().is_empty());
}
