mod change;
mod config_nodes;
mod context;
mod level;
mod operation;
mod php;
mod schema;

pub use change::{
    ChangeKind, DbChange, DiChange, LessChange, Member, MoveDirection, PhpChange, SystemChange,
    TypeSlot, XsdChange,
};
pub use config_nodes::{
    DiConfig, GLOBAL_SCOPE, LessFile, LessRule, LessRuleKind, SystemConfig, SystemField,
    SystemGroup, SystemNode, SystemNodeKind, SystemSection, VirtualType, VirtualTypeDecl,
    XsdNode, XsdNodeKind, XsdSchema,
};
pub use context::Context;
pub use level::Level;
pub use operation::Operation;
pub use php::{
    ClassKind, ClassLike, Constant, Method, Param, Property, TypeDecl, TypeSource, Visibility,
    name_key, name_set, normalize_name,
};
pub use schema::{Column, Constraint, Index, ModuleSchema, Table};
