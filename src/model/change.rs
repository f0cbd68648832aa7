//! Typed change kinds. Every detected difference is one of these; the
//! severity table in `analysis::classify` maps each to a level and code.

/// The member family a membership (API status) change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Declaration,
    Method,
    Property,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhpChange {
    Added,
    Removed,
    MembershipAdded(Member),
    MembershipRemoved(Member),

    ParentAdded,
    ParentRemoved,
    InterfaceAdded,
    InterfaceRemoved,
    TraitAdded,
    TraitRemoved,
    BecameFinal,
    BecameNonFinal,
    BecameAbstract,
    BecameNonAbstract,

    MethodAdded,
    MethodRemoved,
    MethodMovedToParent,
    MethodMovedFromParent,
    MethodOverwriteAdded,
    MethodVisibilityDecreased,
    MethodVisibilityIncreased,
    MethodBecameStatic,
    MethodBecameNonStatic,
    MethodBecameFinal,
    MethodBecameAbstract,

    RequiredParameterAdded,
    OptionalParameterAdded,
    OptionalParameterAddedToExtendable,
    ParameterRemoved,
    ParameterBecameRequired,
    ParameterBecameOptional,
    ParameterTypeChanged,
    ParameterDefaultChanged,

    ReturnTypeAdded,
    ReturnTypeRemoved,
    ReturnTypeChanged,

    ExceptionSubclassed,
    ExceptionSuperclassed,
    ExceptionAdded,
    ExceptionRemoved,

    PropertyAdded,
    PropertyRemoved,
    PropertyMovedToParent,
    PropertyMovedFromParent,
    PropertyVisibilityDecreased,
    PropertyVisibilityIncreased,
    PropertyTypeChanged,
    PropertyBecameStatic,
    PropertyBecameNonStatic,

    ConstantAdded,
    ConstantRemoved,
    ConstantMovedToParent,
    ConstantMovedFromParent,
    ConstantVisibilityDecreased,
    ConstantVisibilityIncreased,
}

/// Which annotation a docblock/inline type move touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSlot {
    Parameter,
    Return,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    DocToInline,
    InlineToDoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbChange {
    TableAdded,
    TableDropped,
    TableResourceChange,
    TableEngineChange,
    TableCommentChange,
    ColumnAdd,
    ColumnRemove,
    ColumnTypeChange,
    ColumnBecameNotNull,
    ColumnBecameNullable,
    ColumnDefaultChange,
    ColumnDefinitionChange,
    IndexAdd,
    IndexRemove,
    IndexChange,
    PrimaryKeyAdd,
    PrimaryKeyRemove,
    PrimaryKeyChange,
    UniqueKeyAdd,
    UniqueKeyRemove,
    UniqueKeyChange,
    ForeignKeyAdd,
    ForeignKeyRemove,
    ForeignKeyChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiChange {
    VirtualTypeAdded,
    VirtualTypeAddedInScope,
    VirtualTypeRemoved,
    VirtualTypeScopeChangedToGlobal,
    VirtualTypeScopeChanged,
    VirtualTypeTypeChanged,
    VirtualTypeSharedChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsdChange {
    SchemaFileAdded,
    SchemaFileRemoved,
    OptionalNodeAdded,
    RequiredNodeAdded,
    NodeRemoved,
    OptionalAttributeAdded,
    RequiredAttributeAdded,
    AttributeRemoved,
    BecameRequired,
    BecameOptional,
    TypeChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemChange {
    FileAdded,
    FileRemoved,
    SectionAdded,
    SectionRemoved,
    GroupAdded,
    GroupRemoved,
    FieldAdded,
    FieldRemoved,
    FieldTypeChanged,
    FieldScopeReduced,
    FieldScopeExtended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessChange {
    FileAdded,
    FileRemoved,
    VariableAdded,
    VariableRemoved,
    VariableValueChanged,
    MixinAdded,
    MixinRemoved,
    ImportAdded,
    ImportRemoved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Php(PhpChange),
    DocType(TypeSlot, MoveDirection),
    Database(DbChange),
    Di(DiChange),
    Xsd(XsdChange),
    System(SystemChange),
    Less(LessChange),
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Php(change) => write!(f, "{:?}", change),
            ChangeKind::DocType(slot, direction) => write!(f, "{:?}Type{:?}", slot, direction),
            ChangeKind::Database(change) => write!(f, "{:?}", change),
            ChangeKind::Di(change) => write!(f, "{:?}", change),
            ChangeKind::Xsd(change) => write!(f, "{:?}", change),
            ChangeKind::System(change) => write!(f, "{:?}", change),
            ChangeKind::Less(change) => write!(f, "{:?}", change),
        }
    }
}
