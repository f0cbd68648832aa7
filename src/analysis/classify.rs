//! Severity table: every `(context, ChangeKind)` pair maps to a level, a
//! stable code and a human reason. Overrides from configuration are applied
//! by code on top of the built-in table.

use crate::model::{
    ChangeKind, ClassKind, Context, DbChange, DiChange, LessChange, Level, Member, MoveDirection,
    Operation, PhpChange, SystemChange, TypeSlot, XsdChange,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub level: Level,
    pub code: String,
    pub reason: &'static str,
}

impl Rule {
    fn new(level: Level, code: impl Into<String>, reason: &'static str) -> Self {
        Self {
            level,
            code: code.into(),
            reason,
        }
    }
}

/// Immutable classification table threaded through every analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityTable {
    overrides: BTreeMap<String, Level>,
}

impl SeverityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, Level>) -> Self {
        Self { overrides }
    }

    pub fn overrides(&self) -> &BTreeMap<String, Level> {
        &self.overrides
    }

    pub fn rule(&self, context: &Context, kind: ChangeKind) -> Rule {
        let mut rule = classify(context, kind);
        if let Some(&level) = self.overrides.get(&rule.code) {
            rule.level = level;
        }
        rule
    }

    /// Build a classified operation for one detected change.
    pub fn operation(
        &self,
        context: Context,
        kind: ChangeKind,
        target: impl Into<String>,
        location: impl Into<PathBuf>,
    ) -> Operation {
        let rule = self.rule(&context, kind);
        Operation {
            kind,
            code: rule.code,
            level: rule.level,
            context,
            target: target.into(),
            location: location.into(),
            reason: rule.reason.to_string(),
        }
    }

    /// Like `operation`, with the before and after values rendered into the reason.
    pub fn value_change(
        &self,
        context: Context,
        kind: ChangeKind,
        target: impl Into<String>,
        location: impl Into<PathBuf>,
        before: &str,
        after: &str,
    ) -> Operation {
        let mut operation = self.operation(context, kind, target, location);
        operation.reason = format!("{}: `{}` -> `{}`", operation.reason, before, after);
        operation
    }
}

/// Built-in classification, without configured overrides.
pub fn classify(context: &Context, kind: ChangeKind) -> Rule {
    match kind {
        ChangeKind::Php(change) => classify_php(php_kind(context), change),
        ChangeKind::DocType(slot, direction) => {
            classify_doc_type(php_kind(context), slot, direction)
        }
        ChangeKind::Database(change) => classify_database(change),
        ChangeKind::Di(change) => classify_di(change),
        ChangeKind::Xsd(change) => classify_xsd(change),
        ChangeKind::System(change) => classify_system(change),
        ChangeKind::Less(change) => classify_less(change),
    }
}

fn php_kind(context: &Context) -> ClassKind {
    match context {
        Context::Interface => ClassKind::Interface,
        Context::Trait => ClassKind::Trait,
        _ => ClassKind::Class,
    }
}

fn php_prefix(kind: ClassKind) -> char {
    match kind {
        ClassKind::Class => 'C',
        ClassKind::Interface => 'I',
        ClassKind::Trait => 'T',
    }
}

fn classify_php(kind: ClassKind, change: PhpChange) -> Rule {
    use Level::*;
    use PhpChange::*;

    let interface = kind == ClassKind::Interface;
    // Implementors of an interface must follow every signature change.
    let per_kind = |class_like: Level| if interface { Major } else { class_like };

    let (number, level, reason): (u16, Level, &'static str) = match change {
        Added => (1, Minor, "Declaration was added"),
        Removed => (2, Major, "Declaration was removed"),
        MembershipAdded(member) => match member {
            Member::Declaration => (900, Minor, "Declaration was added to the public API"),
            Member::Method => (902, Minor, "Method was added to the public API"),
            Member::Property => (904, Minor, "Property was added to the public API"),
            Member::Constant => (906, Minor, "Constant was added to the public API"),
        },
        MembershipRemoved(member) => match member {
            Member::Declaration => (901, Major, "Declaration was removed from the public API"),
            Member::Method => (903, Major, "Method was removed from the public API"),
            Member::Property => (905, Major, "Property was removed from the public API"),
            Member::Constant => (907, Major, "Constant was removed from the public API"),
        },

        ParentAdded => (3, per_kind(Minor), "Parent was added"),
        ParentRemoved => (4, Major, "Parent was removed"),
        InterfaceAdded => (5, Minor, "Interface was added"),
        InterfaceRemoved => (6, Major, "Interface was removed"),
        TraitAdded => (7, Minor, "Trait was added"),
        TraitRemoved => (8, Major, "Trait was removed"),
        BecameFinal => (9, Major, "Declaration became final"),
        BecameNonFinal => (10, Minor, "Declaration is no longer final"),
        BecameAbstract => (11, Major, "Declaration became abstract"),
        BecameNonAbstract => (12, Minor, "Declaration is no longer abstract"),

        MethodAdded => (20, per_kind(Minor), "Method was added"),
        MethodRemoved => (21, Major, "Method was removed"),
        MethodMovedToParent => (22, Patch, "Method was moved to a parent"),
        MethodMovedFromParent => (23, Patch, "Method was moved from a parent"),
        MethodOverwriteAdded => (24, Patch, "Method overwrite was added"),
        MethodVisibilityDecreased => (25, Major, "Method visibility was decreased"),
        MethodVisibilityIncreased => (26, Minor, "Method visibility was increased"),
        MethodBecameStatic => (27, Major, "Method became static"),
        MethodBecameNonStatic => (28, Major, "Method is no longer static"),
        MethodBecameFinal => (29, Major, "Method became final"),
        MethodBecameAbstract => (30, Major, "Method became abstract"),

        RequiredParameterAdded => (40, Major, "Required parameter was added"),
        OptionalParameterAdded => (41, per_kind(Patch), "Optional parameter was added"),
        OptionalParameterAddedToExtendable => (
            42,
            per_kind(Minor),
            "Optional parameter was added to a method of an extendable class",
        ),
        ParameterRemoved => (43, Major, "Parameter was removed"),
        ParameterBecameRequired => (44, Major, "Parameter became required"),
        ParameterBecameOptional => (45, per_kind(Patch), "Parameter became optional"),
        ParameterTypeChanged => (46, Major, "Parameter type was changed"),
        ParameterDefaultChanged => (47, Minor, "Parameter default value was changed"),

        ReturnTypeAdded => (50, Major, "Return type was added"),
        ReturnTypeRemoved => (51, Major, "Return type was removed"),
        ReturnTypeChanged => (52, Major, "Return type was changed"),

        ExceptionSubclassed => (60, Minor, "Thrown exception was replaced by a subclass"),
        ExceptionSuperclassed => (61, Major, "Thrown exception was replaced by a superclass"),
        ExceptionAdded => (62, Major, "New exception is thrown"),
        ExceptionRemoved => (63, Patch, "Exception is no longer thrown"),

        PropertyAdded => (70, Minor, "Property was added"),
        PropertyRemoved => (71, Major, "Property was removed"),
        PropertyMovedToParent => (72, Patch, "Property was moved to a parent"),
        PropertyMovedFromParent => (73, Patch, "Property was moved from a parent"),
        PropertyVisibilityDecreased => (74, Major, "Property visibility was decreased"),
        PropertyVisibilityIncreased => (75, Minor, "Property visibility was increased"),
        PropertyTypeChanged => (76, Major, "Property type was changed"),
        PropertyBecameStatic => (77, Major, "Property became static"),
        PropertyBecameNonStatic => (78, Major, "Property is no longer static"),

        ConstantAdded => (80, Minor, "Constant was added"),
        ConstantRemoved => (81, Major, "Constant was removed"),
        ConstantMovedToParent => (82, Patch, "Constant was moved to a parent"),
        ConstantMovedFromParent => (83, Patch, "Constant was moved from a parent"),
        ConstantVisibilityDecreased => (84, Major, "Constant visibility was decreased"),
        ConstantVisibilityIncreased => (85, Minor, "Constant visibility was increased"),
    };

    Rule::new(level, format!("{}{:03}", php_prefix(kind), number), reason)
}

/// Docblock/inline moves, in `[class, interface, trait]` order per row.
const DOC_TYPE_LEVELS: [(TypeSlot, MoveDirection, [Level; 3]); 6] = [
    (
        TypeSlot::Parameter,
        MoveDirection::DocToInline,
        [Level::Major, Level::Major, Level::Major],
    ),
    (
        TypeSlot::Parameter,
        MoveDirection::InlineToDoc,
        [Level::Major, Level::Major, Level::Patch],
    ),
    (
        TypeSlot::Return,
        MoveDirection::DocToInline,
        [Level::Major, Level::Major, Level::Minor],
    ),
    (
        TypeSlot::Return,
        MoveDirection::InlineToDoc,
        [Level::Patch, Level::Patch, Level::Patch],
    ),
    (
        TypeSlot::Property,
        MoveDirection::DocToInline,
        [Level::Major, Level::Patch, Level::Major],
    ),
    (
        TypeSlot::Property,
        MoveDirection::InlineToDoc,
        [Level::Major, Level::Patch, Level::Major],
    ),
];

fn classify_doc_type(kind: ClassKind, slot: TypeSlot, direction: MoveDirection) -> Rule {
    let column = match kind {
        ClassKind::Class => 0,
        ClassKind::Interface => 1,
        ClassKind::Trait => 2,
    };
    let (row, levels) = DOC_TYPE_LEVELS
        .iter()
        .enumerate()
        .find(|(_, (s, d, _))| *s == slot && *d == direction)
        .map(|(row, (_, _, levels))| (row, levels))
        .unwrap_or((0, &DOC_TYPE_LEVELS[0].2));

    let reason = match (slot, direction) {
        (TypeSlot::Parameter, MoveDirection::DocToInline) => {
            "Parameter type moved from docblock to inline declaration"
        }
        (TypeSlot::Parameter, MoveDirection::InlineToDoc) => {
            "Parameter type moved from inline declaration to docblock"
        }
        (TypeSlot::Return, MoveDirection::DocToInline) => {
            "Return type moved from docblock to inline declaration"
        }
        (TypeSlot::Return, MoveDirection::InlineToDoc) => {
            "Return type moved from inline declaration to docblock"
        }
        (TypeSlot::Property, MoveDirection::DocToInline) => {
            "Property type moved from docblock to inline declaration"
        }
        (TypeSlot::Property, MoveDirection::InlineToDoc) => {
            "Property type moved from inline declaration to docblock"
        }
    };

    Rule::new(
        levels[column],
        format!("D{}", 101 + row * 3 + column),
        reason,
    )
}

fn classify_database(change: DbChange) -> Rule {
    use DbChange::*;
    use Level::*;

    let (number, level, reason) = match change {
        TableAdded => (101, Minor, "Table was added"),
        TableDropped => (102, Major, "Table was dropped"),
        TableResourceChange => (103, Major, "Table resource was changed"),
        TableEngineChange => (104, Minor, "Table engine was changed"),
        TableCommentChange => (105, Patch, "Table comment was changed"),
        ColumnAdd => (106, Minor, "Column was added"),
        ColumnRemove => (107, Major, "Column was removed"),
        ColumnTypeChange => (108, Major, "Column type was changed"),
        ColumnBecameNotNull => (109, Major, "Column became not nullable"),
        ColumnBecameNullable => (110, Minor, "Column became nullable"),
        ColumnDefaultChange => (111, Minor, "Column default was changed"),
        ColumnDefinitionChange => (112, Major, "Column definition was changed"),
        IndexAdd => (113, Minor, "Index was added"),
        IndexRemove => (114, Major, "Index was removed"),
        IndexChange => (115, Major, "Index was changed"),
        PrimaryKeyAdd => (116, Major, "Primary key was added"),
        PrimaryKeyRemove => (117, Major, "Primary key was removed"),
        PrimaryKeyChange => (118, Major, "Primary key was changed"),
        UniqueKeyAdd => (119, Major, "Unique key was added"),
        UniqueKeyRemove => (120, Major, "Unique key was removed"),
        UniqueKeyChange => (121, Major, "Unique key was changed"),
        ForeignKeyAdd => (122, Major, "Foreign key was added"),
        ForeignKeyRemove => (123, Major, "Foreign key was removed"),
        ForeignKeyChange => (124, Major, "Foreign key was changed"),
    };

    Rule::new(level, format!("DB{}", number), reason)
}

fn classify_di(change: DiChange) -> Rule {
    use DiChange::*;
    use Level::*;

    let (number, level, reason) = match change {
        VirtualTypeAdded => (101, Minor, "Virtual type was added"),
        VirtualTypeAddedInScope => (102, Patch, "Virtual type was added in a non-global scope"),
        VirtualTypeRemoved => (103, Major, "Virtual type was removed"),
        VirtualTypeScopeChangedToGlobal => (104, Patch, "Virtual type scope was changed to global"),
        VirtualTypeScopeChanged => (105, Major, "Virtual type scope was changed"),
        VirtualTypeTypeChanged => (106, Major, "Virtual type target type was changed"),
        VirtualTypeSharedChanged => (107, Major, "Virtual type shared flag was changed"),
    };

    Rule::new(level, format!("DI{}", number), reason)
}

fn classify_xsd(change: XsdChange) -> Rule {
    use Level::*;
    use XsdChange::*;

    let (number, level, reason) = match change {
        SchemaFileAdded => (101, Minor, "Schema file was added"),
        SchemaFileRemoved => (102, Major, "Schema file was removed"),
        OptionalNodeAdded => (103, Minor, "Optional node was added"),
        RequiredNodeAdded => (104, Major, "Required node was added"),
        NodeRemoved => (105, Major, "Node was removed"),
        OptionalAttributeAdded => (106, Minor, "Optional attribute was added"),
        RequiredAttributeAdded => (107, Major, "Required attribute was added"),
        AttributeRemoved => (108, Major, "Attribute was removed"),
        BecameRequired => (109, Major, "Node became required"),
        BecameOptional => (110, Minor, "Node became optional"),
        TypeChanged => (111, Major, "Node type was changed"),
    };

    Rule::new(level, format!("X{}", number), reason)
}

fn classify_system(change: SystemChange) -> Rule {
    use Level::*;
    use SystemChange::*;

    let (number, level, reason) = match change {
        FileAdded => (101, Minor, "System configuration file was added"),
        FileRemoved => (102, Major, "System configuration file was removed"),
        SectionAdded => (103, Minor, "Section was added"),
        SectionRemoved => (104, Major, "Section was removed"),
        GroupAdded => (105, Minor, "Group was added"),
        GroupRemoved => (106, Major, "Group was removed"),
        FieldAdded => (107, Minor, "Field was added"),
        FieldRemoved => (108, Major, "Field was removed"),
        FieldTypeChanged => (109, Patch, "Field type was changed"),
        FieldScopeReduced => (110, Major, "Field is shown in fewer scopes"),
        FieldScopeExtended => (111, Minor, "Field is shown in more scopes"),
    };

    Rule::new(level, format!("S{}", number), reason)
}

fn classify_less(change: LessChange) -> Rule {
    use LessChange::*;
    use Level::*;

    let (number, level, reason) = match change {
        FileAdded => (101, Minor, "Stylesheet was added"),
        FileRemoved => (102, Major, "Stylesheet was removed"),
        VariableAdded => (103, Minor, "Variable was added"),
        VariableRemoved => (104, Major, "Variable was removed"),
        VariableValueChanged => (105, Patch, "Variable value was changed"),
        MixinAdded => (106, Minor, "Mixin was added"),
        MixinRemoved => (107, Major, "Mixin was removed"),
        ImportAdded => (108, Patch, "Import was added"),
        ImportRemoved => (109, Major, "Import was removed"),
    };

    Rule::new(level, format!("L{}", number), reason)
}

/// Every built-in rule, used to list codes. PHP and docblock rules are
/// listed once per class-like context.
pub fn all_rules() -> Vec<(Context, ChangeKind, Rule)> {
    let php_contexts = [Context::Class, Context::Interface, Context::Trait];
    let mut kinds: Vec<(Context, ChangeKind)> = Vec::new();

    for context in &php_contexts {
        for &change in ALL_PHP_CHANGES {
            kinds.push((context.clone(), ChangeKind::Php(change)));
        }
        for (slot, direction, _) in DOC_TYPE_LEVELS {
            kinds.push((context.clone(), ChangeKind::DocType(slot, direction)));
        }
    }
    kinds.extend(
        ALL_DB_CHANGES
            .iter()
            .map(|&c| (Context::Database, ChangeKind::Database(c))),
    );
    kinds.extend(ALL_DI_CHANGES.iter().map(|&c| (Context::Di, ChangeKind::Di(c))));
    kinds.extend(ALL_XSD_CHANGES.iter().map(|&c| (Context::Xsd, ChangeKind::Xsd(c))));
    kinds.extend(
        ALL_SYSTEM_CHANGES
            .iter()
            .map(|&c| (Context::System, ChangeKind::System(c))),
    );
    kinds.extend(ALL_LESS_CHANGES.iter().map(|&c| (Context::Less, ChangeKind::Less(c))));

    kinds
        .into_iter()
        .map(|(context, kind)| {
            let rule = classify(&context, kind);
            (context, kind, rule)
        })
        .collect()
}

const ALL_PHP_CHANGES: &[PhpChange] = {
    use PhpChange::*;
    &[
        Added,
        Removed,
        MembershipAdded(Member::Declaration),
        MembershipRemoved(Member::Declaration),
        MembershipAdded(Member::Method),
        MembershipRemoved(Member::Method),
        MembershipAdded(Member::Property),
        MembershipRemoved(Member::Property),
        MembershipAdded(Member::Constant),
        MembershipRemoved(Member::Constant),
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
    ]
};

const ALL_DB_CHANGES: &[DbChange] = {
    use DbChange::*;
    &[
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
    ]
};

const ALL_DI_CHANGES: &[DiChange] = {
    use DiChange::*;
    &[
        VirtualTypeAdded,
        VirtualTypeAddedInScope,
        VirtualTypeRemoved,
        VirtualTypeScopeChangedToGlobal,
        VirtualTypeScopeChanged,
        VirtualTypeTypeChanged,
        VirtualTypeSharedChanged,
    ]
};

const ALL_XSD_CHANGES: &[XsdChange] = {
    use XsdChange::*;
    &[
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
    ]
};

const ALL_SYSTEM_CHANGES: &[SystemChange] = {
    use SystemChange::*;
    &[
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
    ]
};

const ALL_LESS_CHANGES: &[LessChange] = {
    use LessChange::*;
    &[
        FileAdded,
        FileRemoved,
        VariableAdded,
        VariableRemoved,
        VariableValueChanged,
        MixinAdded,
        MixinRemoved,
        ImportAdded,
        ImportRemoved,
    ]
};
