//! injector-impl 集中集成测试工程, 测试位于 `tests/` 目录。
