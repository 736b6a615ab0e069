//! 权限树构建
//!
//! 扁平的 parent_id 记录列表重建为森林。先按 parent_id 一次性
//! 分桶 (保持输入顺序), 再按可达序列逆序装配, 整体 O(n),
//! 没有递归深度问题, 也不会逐层重扫全表。
//!
//! 脏数据的处理原则是静默丢弃而不是报错: 父节点缺失的孤儿、
//! 成环的节点都从根层不可达, 自然不会出现在结果里。

use std::collections::{HashMap, HashSet, VecDeque};

use crate::db::models::Permission;

/// 根引用约定值: parent_id = 0 表示根节点
pub const ROOT_PARENT: i64 = 0;

/// 把扁平列表装配成森林
///
/// 兄弟顺序与输入顺序一致, 调用方负责先排好序 (sort ASC)。
pub fn build_tree(list: Vec<Permission>, root_parent: i64) -> Vec<Permission> {
    // 分桶: parent_id -> 子节点列表; slot 记录每个节点落在
    // 哪个桶的哪个位置, 装配时按坐标原地回填 children
    let mut by_parent: HashMap<i64, Vec<Permission>> = HashMap::new();
    let mut slot: HashMap<i64, (i64, usize)> = HashMap::new();
    for node in list {
        let bucket = by_parent.entry(node.parent_id).or_default();
        slot.insert(node.id, (node.parent_id, bucket.len()));
        bucket.push(node);
    }

    // 从根层 BFS 出可达节点序列; 孤儿和环上的节点永远不入队
    let mut order: Vec<i64> = Vec::with_capacity(slot.len());
    let mut queue: VecDeque<i64> = by_parent
        .get(&root_parent)
        .map(|roots| roots.iter().map(|r| r.id).collect())
        .unwrap_or_default();
    while let Some(id) = queue.pop_front() {
        order.push(id);
        if let Some(children) = by_parent.get(&id) {
            queue.extend(children.iter().map(|c| c.id));
        }
    }

    // 逆序装配: 深层先合拢, 挂接到父节点时子树已经完整
    for &id in order.iter().rev() {
        let Some(children) = by_parent.remove(&id) else {
            continue;
        };
        if let Some(&(parent, idx)) = slot.get(&id)
            && let Some(parent_bucket) = by_parent.get_mut(&parent)
            && let Some(node) = parent_bucket.get_mut(idx)
        {
            node.children = Some(children);
        }
    }

    by_parent.remove(&root_parent).unwrap_or_default()
}

/// 返回 id 及其全部后代的 id 集合 (级联删除的精确范围)
///
/// 显式栈迭代; visited 集合保证脏数据成环时也能终止。
pub fn collect_subtree_ids(list: &[Permission], id: i64) -> Vec<i64> {
    let mut children_of: HashMap<i64, Vec<i64>> = HashMap::new();
    for node in list {
        children_of.entry(node.parent_id).or_default().push(node.id);
    }

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current);
        if let Some(kids) = children_of.get(&current) {
            stack.extend(kids.iter().copied());
        }
    }
    out
}

/// 对森林的根层分页, 子树整体跟随根节点
///
/// total 取根节点数; 越界页返回空列表。
pub fn paginate_roots(forest: Vec<Permission>, page: i64, size: i64) -> (Vec<Permission>, i64) {
    let total = forest.len() as i64;
    let start = ((page - 1) * size).clamp(0, total);
    let count = (total - start).min(size);
    let roots = forest
        .into_iter()
        .skip(start as usize)
        .take(count as usize)
        .collect();
    (roots, total)
}
