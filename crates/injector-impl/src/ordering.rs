//! 成员注入顺序
//!
//! 基类链上的成员按固定全序注入：基类在前，同一类内
//! 静态成员先于实例成员，其余按声明顺序。顺序对同一
//! 模型是确定且幂等的。

/// 成员排序键
///
/// 以 (继承深度, 非静态标志, 声明下标) 为键升序排序即得
/// [基类静态, 基类实例, 派生静态, 派生实例] 的注入顺序。
pub fn rank(depth: usize, is_static: bool, decl_index: usize) -> (usize, bool, usize) {
    (depth, !is_static, decl_index)
}
