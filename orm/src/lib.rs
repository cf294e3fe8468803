// 数据实体层
// 每张表一个实体文件，按领域分组

pub mod entities;
