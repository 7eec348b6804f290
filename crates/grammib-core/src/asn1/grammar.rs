//! Token and production tables for the SMI subset of ASN.1.
//!
//! These tables are configuration handed to the generic runtime: keyword
//! literals are registered before the identifier regex so equal-length
//! matches resolve to the keyword, and the productions are written to be
//! LL(2) at worst (the assignment and SEQUENCE forks need two tokens).
//!
//! MACRO bodies are not given structure: they are consumed as a flat token
//! stream up to the closing END and recorded as macro symbols only.

use alloc::vec;
use alloc::vec::Vec;

use grammib_parse::{
    GrammarError, Parser, ProductionElement as E, ProductionPattern, TokenPattern, Tokenizer,
    UNBOUNDED,
};

/// Token ids.
pub mod token {
    /// `.`
    pub const DOT: usize = 1;
    /// `..`
    pub const DOTDOT: usize = 2;
    /// `,`
    pub const COMMA: usize = 3;
    /// `;`
    pub const SEMICOLON: usize = 4;
    /// `(`
    pub const LPAREN: usize = 5;
    /// `)`
    pub const RPAREN: usize = 6;
    /// `{`
    pub const LBRACE: usize = 7;
    /// `}`
    pub const RBRACE: usize = 8;
    /// `[`
    pub const LBRACKET: usize = 9;
    /// `]`
    pub const RBRACKET: usize = 10;
    /// `|`
    pub const BAR: usize = 11;
    /// `::=`
    pub const DEFINITION: usize = 12;

    /// `DEFINITIONS`
    pub const DEFINITIONS: usize = 20;
    /// `BEGIN`
    pub const BEGIN: usize = 21;
    /// `END`
    pub const END: usize = 22;
    /// `IMPORTS`
    pub const IMPORTS: usize = 23;
    /// `EXPORTS`
    pub const EXPORTS: usize = 24;
    /// `FROM`
    pub const FROM: usize = 25;
    /// `MACRO`
    pub const MACRO: usize = 26;
    /// `EXPLICIT`
    pub const EXPLICIT: usize = 27;
    /// `IMPLICIT`
    pub const IMPLICIT: usize = 28;
    /// `TAGS`
    pub const TAGS: usize = 29;
    /// `INTEGER`
    pub const INTEGER: usize = 30;
    /// `OCTET`
    pub const OCTET: usize = 31;
    /// `STRING`
    pub const STRING: usize = 32;
    /// `OBJECT`
    pub const OBJECT: usize = 33;
    /// `IDENTIFIER`
    pub const IDENTIFIER: usize = 34;
    /// `SEQUENCE`
    pub const SEQUENCE: usize = 35;
    /// `OF`
    pub const OF: usize = 36;
    /// `CHOICE`
    pub const CHOICE: usize = 37;
    /// `BITS`
    pub const BITS: usize = 38;
    /// `SIZE`
    pub const SIZE: usize = 39;
    /// `UNIVERSAL`
    pub const UNIVERSAL: usize = 40;
    /// `APPLICATION`
    pub const APPLICATION: usize = 41;
    /// `PRIVATE`
    pub const PRIVATE: usize = 42;
    /// `MIN`
    pub const MIN: usize = 43;
    /// `MAX`
    pub const MAX: usize = 44;

    /// `MODULE-IDENTITY`
    pub const MODULE_IDENTITY: usize = 50;
    /// `OBJECT-IDENTITY`
    pub const OBJECT_IDENTITY: usize = 51;
    /// `OBJECT-TYPE`
    pub const OBJECT_TYPE: usize = 52;
    /// `NOTIFICATION-TYPE`
    pub const NOTIFICATION_TYPE: usize = 53;
    /// `TRAP-TYPE`
    pub const TRAP_TYPE: usize = 54;
    /// `TEXTUAL-CONVENTION`
    pub const TEXTUAL_CONVENTION: usize = 55;
    /// `OBJECT-GROUP`
    pub const OBJECT_GROUP: usize = 56;
    /// `NOTIFICATION-GROUP`
    pub const NOTIFICATION_GROUP: usize = 57;
    /// `MODULE-COMPLIANCE`
    pub const MODULE_COMPLIANCE: usize = 58;
    /// `AGENT-CAPABILITIES`
    pub const AGENT_CAPABILITIES: usize = 59;

    /// `SYNTAX`
    pub const SYNTAX: usize = 70;
    /// `UNITS`
    pub const UNITS: usize = 71;
    /// `ACCESS`
    pub const ACCESS: usize = 72;
    /// `MAX-ACCESS`
    pub const MAX_ACCESS: usize = 73;
    /// `MIN-ACCESS`
    pub const MIN_ACCESS: usize = 74;
    /// `STATUS`
    pub const STATUS: usize = 75;
    /// `DESCRIPTION`
    pub const DESCRIPTION: usize = 76;
    /// `REFERENCE`
    pub const REFERENCE: usize = 77;
    /// `INDEX`
    pub const INDEX: usize = 78;
    /// `AUGMENTS`
    pub const AUGMENTS: usize = 79;
    /// `IMPLIED`
    pub const IMPLIED: usize = 80;
    /// `DEFVAL`
    pub const DEFVAL: usize = 81;
    /// `OBJECTS`
    pub const OBJECTS: usize = 82;
    /// `NOTIFICATIONS`
    pub const NOTIFICATIONS: usize = 83;
    /// `VARIABLES`
    pub const VARIABLES: usize = 84;
    /// `ENTERPRISE`
    pub const ENTERPRISE: usize = 85;
    /// `DISPLAY-HINT`
    pub const DISPLAY_HINT: usize = 86;
    /// `LAST-UPDATED`
    pub const LAST_UPDATED: usize = 87;
    /// `ORGANIZATION`
    pub const ORGANIZATION: usize = 88;
    /// `CONTACT-INFO`
    pub const CONTACT_INFO: usize = 89;
    /// `REVISION`
    pub const REVISION: usize = 90;
    /// `MODULE`
    pub const MODULE: usize = 91;
    /// `MANDATORY-GROUPS`
    pub const MANDATORY_GROUPS: usize = 92;
    /// `GROUP`
    pub const GROUP: usize = 93;
    /// `WRITE-SYNTAX`
    pub const WRITE_SYNTAX: usize = 94;
    /// `PRODUCT-RELEASE`
    pub const PRODUCT_RELEASE: usize = 95;
    /// `SUPPORTS`
    pub const SUPPORTS: usize = 96;
    /// `INCLUDES`
    pub const INCLUDES: usize = 97;
    /// `VARIATION`
    pub const VARIATION: usize = 98;
    /// `CREATION-REQUIRES`
    pub const CREATION_REQUIRES: usize = 99;

    /// Identifier (upper- or lowercase; single hyphens allowed inside).
    pub const IDENT: usize = 110;
    /// Decimal number, possibly negative.
    pub const NUMBER: usize = 111;
    /// `'0101'B`
    pub const BIN_STRING: usize = 112;
    /// `'FF'H`
    pub const HEX_STRING: usize = 113;
    /// `"..."`
    pub const QUOTED: usize = 114;
    /// Whitespace (ignored).
    pub const WHITESPACE: usize = 115;
    /// `--` comment (ignored).
    pub const COMMENT: usize = 116;
}

/// Production ids.
#[allow(missing_docs)]
pub mod prod {
    pub const START: usize = 1001;
    pub const MODULE_DEFINITION: usize = 1002;
    pub const MODULE_IDENTIFIER: usize = 1003;
    pub const TAG_DEFAULT: usize = 1004;
    pub const MODULE_BODY: usize = 1005;
    pub const EXPORT_LIST: usize = 1006;
    pub const IMPORT_LIST: usize = 1007;
    pub const SYMBOLS_FROM: usize = 1008;
    pub const SYMBOL_LIST: usize = 1009;
    pub const SYMBOL_LIST_REST: usize = 1010;
    pub const SYMBOL: usize = 1011;
    pub const ASSIGNMENT: usize = 1012;
    pub const MACRO_DEFINITION: usize = 1013;
    pub const MACRO_TOKEN: usize = 1014;
    pub const TYPE_ASSIGNMENT: usize = 1015;
    pub const VALUE_ASSIGNMENT: usize = 1016;
    pub const TYPE: usize = 1017;
    pub const TAGGED_TYPE: usize = 1018;
    pub const TAG: usize = 1019;
    pub const TAG_CLASS: usize = 1020;
    pub const INTEGER_TYPE: usize = 1021;
    pub const INTEGER_SUFFIX: usize = 1022;
    pub const NAMED_NUMBER_BLOCK: usize = 1023;
    pub const NAMED_NUMBER_REST: usize = 1024;
    pub const NAMED_NUMBER: usize = 1025;
    pub const STRING_TYPE: usize = 1026;
    pub const OBJECT_ID_TYPE: usize = 1027;
    pub const SEQUENCE_TYPE: usize = 1028;
    pub const ELEMENT_TYPE_REST: usize = 1029;
    pub const ELEMENT_TYPE: usize = 1030;
    pub const SEQUENCE_OF_TYPE: usize = 1031;
    pub const CHOICE_TYPE: usize = 1032;
    pub const BITS_TYPE: usize = 1033;
    pub const DEFINED_TYPE: usize = 1034;
    pub const MODULE_SUFFIX: usize = 1035;
    pub const TYPE_REFINEMENT: usize = 1036;
    pub const CONSTRAINT: usize = 1037;
    pub const CONSTRAINT_SPEC: usize = 1038;
    pub const SIZE_CONSTRAINT: usize = 1039;
    pub const RANGE_LIST: usize = 1040;
    pub const RANGE_REST: usize = 1041;
    pub const RANGE: usize = 1042;
    pub const RANGE_UPPER: usize = 1043;
    pub const RANGE_VALUE: usize = 1044;
    pub const VALUE: usize = 1045;
    pub const BRACE_VALUE: usize = 1046;
    pub const BRACE_ITEM: usize = 1047;
    pub const SUB_ID_SUFFIX: usize = 1048;
    pub const DEFINED_MACRO_TYPE: usize = 1049;
    pub const SNMP_MODULE_IDENTITY: usize = 1050;
    pub const SNMP_OBJECT_IDENTITY: usize = 1051;
    pub const SNMP_OBJECT_TYPE: usize = 1052;
    pub const SNMP_NOTIFICATION_TYPE: usize = 1053;
    pub const SNMP_TRAP_TYPE: usize = 1054;
    pub const SNMP_TEXTUAL_CONVENTION: usize = 1055;
    pub const SNMP_OBJECT_GROUP: usize = 1056;
    pub const SNMP_NOTIFICATION_GROUP: usize = 1057;
    pub const SNMP_MODULE_COMPLIANCE: usize = 1058;
    pub const SNMP_AGENT_CAPABILITIES: usize = 1059;
    pub const SYNTAX_PART: usize = 1060;
    pub const UNITS_PART: usize = 1061;
    pub const ACCESS_PART: usize = 1062;
    pub const STATUS_PART: usize = 1063;
    pub const DESCR_PART: usize = 1064;
    pub const REFER_PART: usize = 1065;
    pub const INDEX_PART: usize = 1066;
    pub const INDEX_LIST: usize = 1067;
    pub const INDEX_REST: usize = 1068;
    pub const INDEX_ITEM: usize = 1069;
    pub const DEFVAL_PART: usize = 1070;
    pub const OBJECTS_PART: usize = 1071;
    pub const NOTIFICATIONS_PART: usize = 1072;
    pub const VARIABLES_PART: usize = 1073;
    pub const NAME_LIST: usize = 1074;
    pub const NAME_REST: usize = 1075;
    pub const ENTERPRISE_PART: usize = 1076;
    pub const DISPLAY_PART: usize = 1077;
    pub const LAST_UPDATED_PART: usize = 1078;
    pub const ORGANIZATION_PART: usize = 1079;
    pub const CONTACT_PART: usize = 1080;
    pub const REVISION_PART: usize = 1081;
    pub const MODULE_PART: usize = 1082;
    pub const MODULE_NAME_PART: usize = 1083;
    pub const MANDATORY_PART: usize = 1084;
    pub const COMPLIANCE_PART: usize = 1085;
    pub const COMPLIANCE_GROUP: usize = 1086;
    pub const COMPLIANCE_OBJECT: usize = 1087;
    pub const WRITE_SYNTAX_PART: usize = 1088;
    pub const MIN_ACCESS_PART: usize = 1089;
    pub const PRODUCT_RELEASE_PART: usize = 1090;
    pub const MODULE_SUPPORT_PART: usize = 1091;
    pub const VARIATION_PART: usize = 1092;
    pub const CREATION_PART: usize = 1093;
}

/// The keyword literals, in registration order.
const KEYWORDS: &[(usize, &str)] = &[
    (token::DEFINITIONS, "DEFINITIONS"),
    (token::BEGIN, "BEGIN"),
    (token::END, "END"),
    (token::IMPORTS, "IMPORTS"),
    (token::EXPORTS, "EXPORTS"),
    (token::FROM, "FROM"),
    (token::MACRO, "MACRO"),
    (token::EXPLICIT, "EXPLICIT"),
    (token::IMPLICIT, "IMPLICIT"),
    (token::TAGS, "TAGS"),
    (token::INTEGER, "INTEGER"),
    (token::OCTET, "OCTET"),
    (token::STRING, "STRING"),
    (token::OBJECT, "OBJECT"),
    (token::IDENTIFIER, "IDENTIFIER"),
    (token::SEQUENCE, "SEQUENCE"),
    (token::OF, "OF"),
    (token::CHOICE, "CHOICE"),
    (token::BITS, "BITS"),
    (token::SIZE, "SIZE"),
    (token::UNIVERSAL, "UNIVERSAL"),
    (token::APPLICATION, "APPLICATION"),
    (token::PRIVATE, "PRIVATE"),
    (token::MIN, "MIN"),
    (token::MAX, "MAX"),
    (token::MODULE_IDENTITY, "MODULE-IDENTITY"),
    (token::OBJECT_IDENTITY, "OBJECT-IDENTITY"),
    (token::OBJECT_TYPE, "OBJECT-TYPE"),
    (token::NOTIFICATION_TYPE, "NOTIFICATION-TYPE"),
    (token::TRAP_TYPE, "TRAP-TYPE"),
    (token::TEXTUAL_CONVENTION, "TEXTUAL-CONVENTION"),
    (token::OBJECT_GROUP, "OBJECT-GROUP"),
    (token::NOTIFICATION_GROUP, "NOTIFICATION-GROUP"),
    (token::MODULE_COMPLIANCE, "MODULE-COMPLIANCE"),
    (token::AGENT_CAPABILITIES, "AGENT-CAPABILITIES"),
    (token::SYNTAX, "SYNTAX"),
    (token::UNITS, "UNITS"),
    (token::ACCESS, "ACCESS"),
    (token::MAX_ACCESS, "MAX-ACCESS"),
    (token::MIN_ACCESS, "MIN-ACCESS"),
    (token::STATUS, "STATUS"),
    (token::DESCRIPTION, "DESCRIPTION"),
    (token::REFERENCE, "REFERENCE"),
    (token::INDEX, "INDEX"),
    (token::AUGMENTS, "AUGMENTS"),
    (token::IMPLIED, "IMPLIED"),
    (token::DEFVAL, "DEFVAL"),
    (token::OBJECTS, "OBJECTS"),
    (token::NOTIFICATIONS, "NOTIFICATIONS"),
    (token::VARIABLES, "VARIABLES"),
    (token::ENTERPRISE, "ENTERPRISE"),
    (token::DISPLAY_HINT, "DISPLAY-HINT"),
    (token::LAST_UPDATED, "LAST-UPDATED"),
    (token::ORGANIZATION, "ORGANIZATION"),
    (token::CONTACT_INFO, "CONTACT-INFO"),
    (token::REVISION, "REVISION"),
    (token::MODULE, "MODULE"),
    (token::MANDATORY_GROUPS, "MANDATORY-GROUPS"),
    (token::GROUP, "GROUP"),
    (token::WRITE_SYNTAX, "WRITE-SYNTAX"),
    (token::PRODUCT_RELEASE, "PRODUCT-RELEASE"),
    (token::SUPPORTS, "SUPPORTS"),
    (token::INCLUDES, "INCLUDES"),
    (token::VARIATION, "VARIATION"),
    (token::CREATION_REQUIRES, "CREATION-REQUIRES"),
];

/// The punctuation literals.
const PUNCTUATION: &[(usize, &str, &str)] = &[
    (token::DEFINITION, "DEFINITION", "::="),
    (token::DOTDOT, "DOTDOT", ".."),
    (token::DOT, "DOT", "."),
    (token::COMMA, "COMMA", ","),
    (token::SEMICOLON, "SEMICOLON", ";"),
    (token::LPAREN, "LPAREN", "("),
    (token::RPAREN, "RPAREN", ")"),
    (token::LBRACE, "LBRACE", "{"),
    (token::RBRACE, "RBRACE", "}"),
    (token::LBRACKET, "LBRACKET", "["),
    (token::RBRACKET, "RBRACKET", "]"),
    (token::BAR, "BAR", "|"),
];

/// Register the SMI token patterns on a tokenizer.
///
/// Keywords precede the identifier regex so that equal-length matches
/// resolve to the keyword; identifiers follow the SMI rule of single
/// interior hyphens, which keeps a trailing `--` out of the identifier
/// and lets the comment pattern claim it.
pub fn register_tokens(tokenizer: &mut Tokenizer) -> Result<(), GrammarError> {
    for &(id, name, image) in PUNCTUATION {
        tokenizer.add_pattern(TokenPattern::literal(id, name, image))?;
    }
    for &(id, text) in KEYWORDS {
        tokenizer.add_pattern(TokenPattern::literal(id, text, text))?;
    }
    tokenizer.add_pattern(TokenPattern::regex(
        token::IDENT,
        "IDENT",
        "[a-zA-Z](-?[a-zA-Z0-9_])*",
    ))?;
    tokenizer.add_pattern(TokenPattern::regex(token::NUMBER, "NUMBER", "-?[0-9]+"))?;
    tokenizer.add_pattern(TokenPattern::regex(
        token::BIN_STRING,
        "BIN_STRING",
        "'[01]*'(B|b)",
    ))?;
    tokenizer.add_pattern(TokenPattern::regex(
        token::HEX_STRING,
        "HEX_STRING",
        "'[0-9A-Fa-f]*'(H|h)",
    ))?;
    tokenizer.add_pattern(TokenPattern::regex(token::QUOTED, "QUOTED", "\"[^\"]*\""))?;
    tokenizer.add_pattern(
        TokenPattern::regex(token::WHITESPACE, "WHITESPACE", "[ \\t\\r\\n\\x0b\\x0c]+").ignored(),
    )?;
    // Comment body runs to the closing dash pair; trailing dash runs are
    // absorbed so separator lines lex as one comment.
    tokenizer.add_pattern(
        TokenPattern::regex(
            token::COMMENT,
            "COMMENT",
            "--([^\\r\\n-]|-[^\\r\\n-])*-*",
        )
        .ignored(),
    )?;
    Ok(())
}

/// A required token.
fn t(id: usize) -> E {
    E::token(id, 1, 1)
}

/// An optional token.
fn t_opt(id: usize) -> E {
    E::token(id, 0, 1)
}

/// A required production.
fn p(id: usize) -> E {
    E::production(id, 1, 1)
}

/// An optional production.
fn p_opt(id: usize) -> E {
    E::production(id, 0, 1)
}

/// Zero or more occurrences of a production.
fn p_star(id: usize) -> E {
    E::production(id, 0, UNBOUNDED)
}

/// One or more occurrences of a production.
fn p_plus(id: usize) -> E {
    E::production(id, 1, UNBOUNDED)
}

/// Register the SMI production patterns on a parser.
#[allow(clippy::too_many_lines)]
pub fn register_productions(parser: &mut Parser) -> Result<(), GrammarError> {
    use prod::*;
    use token as tk;

    let mut add = |pattern: ProductionPattern| parser.add_pattern(pattern);

    add(ProductionPattern::new(START, "Start")
        .with_alternative(vec![p_plus(MODULE_DEFINITION)]))?;

    add(ProductionPattern::new(MODULE_DEFINITION, "ModuleDefinition").with_alternative(vec![
        p(MODULE_IDENTIFIER),
        t(tk::DEFINITIONS),
        p_opt(TAG_DEFAULT),
        t(tk::DEFINITION),
        t(tk::BEGIN),
        p(MODULE_BODY),
        t(tk::END),
    ]))?;

    add(ProductionPattern::new(MODULE_IDENTIFIER, "ModuleIdentifier")
        .with_alternative(vec![t(tk::IDENT), p_opt(BRACE_VALUE)]))?;

    let mut tag_default = ProductionPattern::new(TAG_DEFAULT, "TagDefault");
    tag_default.add_alternative(alt(vec![t(tk::EXPLICIT), t(tk::TAGS)]));
    tag_default.add_alternative(alt(vec![t(tk::IMPLICIT), t(tk::TAGS)]));
    add(tag_default)?;

    add(ProductionPattern::new(MODULE_BODY, "ModuleBody").with_alternative(vec![
        p_opt(EXPORT_LIST),
        p_opt(IMPORT_LIST),
        p_star(ASSIGNMENT),
    ]))?;

    add(ProductionPattern::new(EXPORT_LIST, "ExportList").with_alternative(vec![
        t(tk::EXPORTS),
        p_opt(SYMBOL_LIST),
        t(tk::SEMICOLON),
    ]))?;

    add(ProductionPattern::new(IMPORT_LIST, "ImportList").with_alternative(vec![
        t(tk::IMPORTS),
        p_star(SYMBOLS_FROM),
        t(tk::SEMICOLON),
    ]))?;

    add(ProductionPattern::new(SYMBOLS_FROM, "SymbolsFromModule").with_alternative(vec![
        p(SYMBOL_LIST),
        t(tk::FROM),
        t(tk::IDENT),
    ]))?;

    add(ProductionPattern::new(SYMBOL_LIST, "SymbolList")
        .with_alternative(vec![p(SYMBOL), p_star(SYMBOL_LIST_REST)]))?;

    add(ProductionPattern::new(SYMBOL_LIST_REST, "SymbolListRest")
        .synthetic()
        .with_alternative(vec![t(tk::COMMA), p(SYMBOL)]))?;

    let mut symbol = ProductionPattern::new(SYMBOL, "Symbol");
    for id in [
        tk::IDENT,
        tk::MODULE_IDENTITY,
        tk::OBJECT_IDENTITY,
        tk::OBJECT_TYPE,
        tk::NOTIFICATION_TYPE,
        tk::TRAP_TYPE,
        tk::TEXTUAL_CONVENTION,
        tk::OBJECT_GROUP,
        tk::NOTIFICATION_GROUP,
        tk::MODULE_COMPLIANCE,
        tk::AGENT_CAPABILITIES,
    ] {
        symbol.add_alternative(alt(vec![t(id)]));
    }
    add(symbol)?;

    let mut assignment = ProductionPattern::new(ASSIGNMENT, "Assignment");
    assignment.add_alternative(alt(vec![p(MACRO_DEFINITION)]));
    assignment.add_alternative(alt(vec![p(TYPE_ASSIGNMENT)]));
    assignment.add_alternative(alt(vec![p(VALUE_ASSIGNMENT)]));
    add(assignment)?;

    add(ProductionPattern::new(MACRO_DEFINITION, "MacroDefinition").with_alternative(vec![
        p(SYMBOL),
        t(tk::MACRO),
        t(tk::DEFINITION),
        t(tk::BEGIN),
        p_star(MACRO_TOKEN),
        t(tk::END),
    ]))?;

    // Any token may appear in a macro body except BEGIN/END.
    let mut macro_token = ProductionPattern::new(MACRO_TOKEN, "MacroToken").synthetic();
    for &(id, _, _) in PUNCTUATION {
        macro_token.add_alternative(alt(vec![t(id)]));
    }
    for &(id, _) in KEYWORDS {
        if id != tk::BEGIN && id != tk::END {
            macro_token.add_alternative(alt(vec![t(id)]));
        }
    }
    for id in [
        tk::IDENT,
        tk::NUMBER,
        tk::BIN_STRING,
        tk::HEX_STRING,
        tk::QUOTED,
    ] {
        macro_token.add_alternative(alt(vec![t(id)]));
    }
    add(macro_token)?;

    add(ProductionPattern::new(TYPE_ASSIGNMENT, "TypeAssignment").with_alternative(vec![
        t(tk::IDENT),
        t(tk::DEFINITION),
        p(TYPE),
    ]))?;

    add(ProductionPattern::new(VALUE_ASSIGNMENT, "ValueAssignment").with_alternative(vec![
        t(tk::IDENT),
        p(TYPE),
        t(tk::DEFINITION),
        p(VALUE),
    ]))?;

    let mut ty = ProductionPattern::new(TYPE, "Type");
    for id in [
        TAGGED_TYPE,
        INTEGER_TYPE,
        STRING_TYPE,
        OBJECT_ID_TYPE,
        SEQUENCE_OF_TYPE,
        SEQUENCE_TYPE,
        CHOICE_TYPE,
        BITS_TYPE,
        DEFINED_MACRO_TYPE,
        DEFINED_TYPE,
    ] {
        ty.add_alternative(alt(vec![p(id)]));
    }
    add(ty)?;

    add(ProductionPattern::new(TAGGED_TYPE, "TaggedType").with_alternative(vec![
        p(TAG),
        t_opt(tk::IMPLICIT),
        p(TYPE),
    ]))?;

    add(ProductionPattern::new(TAG, "Tag").with_alternative(vec![
        t(tk::LBRACKET),
        p_opt(TAG_CLASS),
        t(tk::NUMBER),
        t(tk::RBRACKET),
    ]))?;

    let mut tag_class = ProductionPattern::new(TAG_CLASS, "TagClass");
    for id in [tk::UNIVERSAL, tk::APPLICATION, tk::PRIVATE] {
        tag_class.add_alternative(alt(vec![t(id)]));
    }
    add(tag_class)?;

    add(ProductionPattern::new(INTEGER_TYPE, "IntegerType")
        .with_alternative(vec![t(tk::INTEGER), p_opt(INTEGER_SUFFIX)]))?;

    let mut integer_suffix = ProductionPattern::new(INTEGER_SUFFIX, "IntegerSuffix").synthetic();
    integer_suffix.add_alternative(alt(vec![p(NAMED_NUMBER_BLOCK)]));
    integer_suffix.add_alternative(alt(vec![p(CONSTRAINT)]));
    add(integer_suffix)?;

    add(ProductionPattern::new(NAMED_NUMBER_BLOCK, "NamedNumberBlock").with_alternative(vec![
        t(tk::LBRACE),
        p(NAMED_NUMBER),
        p_star(NAMED_NUMBER_REST),
        t(tk::RBRACE),
    ]))?;

    add(ProductionPattern::new(NAMED_NUMBER_REST, "NamedNumberRest")
        .synthetic()
        .with_alternative(vec![t(tk::COMMA), p(NAMED_NUMBER)]))?;

    add(ProductionPattern::new(NAMED_NUMBER, "NamedNumber").with_alternative(vec![
        t(tk::IDENT),
        t(tk::LPAREN),
        t(tk::NUMBER),
        t(tk::RPAREN),
    ]))?;

    add(ProductionPattern::new(STRING_TYPE, "StringType").with_alternative(vec![
        t(tk::OCTET),
        t(tk::STRING),
        p_opt(CONSTRAINT),
    ]))?;

    add(ProductionPattern::new(OBJECT_ID_TYPE, "ObjectIdentifierType")
        .with_alternative(vec![t(tk::OBJECT), t(tk::IDENTIFIER)]))?;

    add(ProductionPattern::new(SEQUENCE_TYPE, "SequenceType").with_alternative(vec![
        t(tk::SEQUENCE),
        t(tk::LBRACE),
        p(ELEMENT_TYPE),
        p_star(ELEMENT_TYPE_REST),
        t(tk::RBRACE),
    ]))?;

    add(ProductionPattern::new(ELEMENT_TYPE_REST, "ElementTypeRest")
        .synthetic()
        .with_alternative(vec![t(tk::COMMA), p(ELEMENT_TYPE)]))?;

    add(ProductionPattern::new(ELEMENT_TYPE, "ElementType")
        .with_alternative(vec![t(tk::IDENT), p(TYPE)]))?;

    add(ProductionPattern::new(SEQUENCE_OF_TYPE, "SequenceOfType").with_alternative(vec![
        t(tk::SEQUENCE),
        p_opt(CONSTRAINT),
        t(tk::OF),
        p(TYPE),
    ]))?;

    add(ProductionPattern::new(CHOICE_TYPE, "ChoiceType").with_alternative(vec![
        t(tk::CHOICE),
        t(tk::LBRACE),
        p(ELEMENT_TYPE),
        p_star(ELEMENT_TYPE_REST),
        t(tk::RBRACE),
    ]))?;

    add(ProductionPattern::new(BITS_TYPE, "BitsType")
        .with_alternative(vec![t(tk::BITS), p_opt(NAMED_NUMBER_BLOCK)]))?;

    add(ProductionPattern::new(DEFINED_TYPE, "DefinedType").with_alternative(vec![
        t(tk::IDENT),
        p_opt(MODULE_SUFFIX),
        p_opt(TYPE_REFINEMENT),
    ]))?;

    add(ProductionPattern::new(MODULE_SUFFIX, "ModuleSuffix")
        .synthetic()
        .with_alternative(vec![t(tk::DOT), t(tk::IDENT)]))?;

    let mut refinement = ProductionPattern::new(TYPE_REFINEMENT, "TypeRefinement").synthetic();
    refinement.add_alternative(alt(vec![p(CONSTRAINT)]));
    refinement.add_alternative(alt(vec![p(NAMED_NUMBER_BLOCK)]));
    add(refinement)?;

    add(ProductionPattern::new(CONSTRAINT, "Constraint").with_alternative(vec![
        t(tk::LPAREN),
        p(CONSTRAINT_SPEC),
        t(tk::RPAREN),
    ]))?;

    let mut spec = ProductionPattern::new(CONSTRAINT_SPEC, "ConstraintSpec").synthetic();
    spec.add_alternative(alt(vec![p(SIZE_CONSTRAINT)]));
    spec.add_alternative(alt(vec![p(RANGE_LIST)]));
    add(spec)?;

    add(ProductionPattern::new(SIZE_CONSTRAINT, "SizeConstraint").with_alternative(vec![
        t(tk::SIZE),
        t(tk::LPAREN),
        p(RANGE_LIST),
        t(tk::RPAREN),
    ]))?;

    add(ProductionPattern::new(RANGE_LIST, "RangeList")
        .with_alternative(vec![p(RANGE), p_star(RANGE_REST)]))?;

    add(ProductionPattern::new(RANGE_REST, "RangeRest")
        .synthetic()
        .with_alternative(vec![t(tk::BAR), p(RANGE)]))?;

    add(ProductionPattern::new(RANGE, "Range")
        .with_alternative(vec![p(RANGE_VALUE), p_opt(RANGE_UPPER)]))?;

    add(ProductionPattern::new(RANGE_UPPER, "RangeUpper")
        .synthetic()
        .with_alternative(vec![t(tk::DOTDOT), p(RANGE_VALUE)]))?;

    let mut range_value = ProductionPattern::new(RANGE_VALUE, "RangeValue");
    for id in [tk::NUMBER, tk::BIN_STRING, tk::HEX_STRING, tk::MIN, tk::MAX] {
        range_value.add_alternative(alt(vec![t(id)]));
    }
    add(range_value)?;

    let mut value = ProductionPattern::new(VALUE, "Value");
    for id in [tk::NUMBER, tk::BIN_STRING, tk::HEX_STRING, tk::QUOTED, tk::IDENT] {
        value.add_alternative(alt(vec![t(id)]));
    }
    value.add_alternative(alt(vec![p(BRACE_VALUE)]));
    add(value)?;

    add(ProductionPattern::new(BRACE_VALUE, "BraceValue").with_alternative(vec![
        t(tk::LBRACE),
        p_star(BRACE_ITEM),
        t(tk::RBRACE),
    ]))?;

    let mut brace_item = ProductionPattern::new(BRACE_ITEM, "BraceItem");
    brace_item.add_alternative(alt(vec![t(tk::NUMBER)]));
    brace_item.add_alternative(alt(vec![t(tk::COMMA)]));
    brace_item.add_alternative(alt(vec![t(tk::IDENT), p_opt(SUB_ID_SUFFIX)]));
    add(brace_item)?;

    add(ProductionPattern::new(SUB_ID_SUFFIX, "SubIdSuffix")
        .synthetic()
        .with_alternative(vec![t(tk::LPAREN), t(tk::NUMBER), t(tk::RPAREN)]))?;

    let mut defined_macro = ProductionPattern::new(DEFINED_MACRO_TYPE, "DefinedMacroType");
    for id in [
        SNMP_MODULE_IDENTITY,
        SNMP_OBJECT_IDENTITY,
        SNMP_OBJECT_TYPE,
        SNMP_NOTIFICATION_TYPE,
        SNMP_TRAP_TYPE,
        SNMP_TEXTUAL_CONVENTION,
        SNMP_OBJECT_GROUP,
        SNMP_NOTIFICATION_GROUP,
        SNMP_MODULE_COMPLIANCE,
        SNMP_AGENT_CAPABILITIES,
    ] {
        defined_macro.add_alternative(alt(vec![p(id)]));
    }
    add(defined_macro)?;

    add(
        ProductionPattern::new(SNMP_MODULE_IDENTITY, "SnmpModuleIdentity").with_alternative(vec![
            t(tk::MODULE_IDENTITY),
            p(LAST_UPDATED_PART),
            p(ORGANIZATION_PART),
            p(CONTACT_PART),
            p(DESCR_PART),
            p_star(REVISION_PART),
        ]),
    )?;

    add(
        ProductionPattern::new(SNMP_OBJECT_IDENTITY, "SnmpObjectIdentity").with_alternative(vec![
            t(tk::OBJECT_IDENTITY),
            p(STATUS_PART),
            p(DESCR_PART),
            p_opt(REFER_PART),
        ]),
    )?;

    add(ProductionPattern::new(SNMP_OBJECT_TYPE, "SnmpObjectType").with_alternative(vec![
        t(tk::OBJECT_TYPE),
        p(SYNTAX_PART),
        p_opt(UNITS_PART),
        p(ACCESS_PART),
        p(STATUS_PART),
        p_opt(DESCR_PART),
        p_opt(REFER_PART),
        p_opt(INDEX_PART),
        p_opt(DEFVAL_PART),
    ]))?;

    add(
        ProductionPattern::new(SNMP_NOTIFICATION_TYPE, "SnmpNotificationType").with_alternative(
            vec![
                t(tk::NOTIFICATION_TYPE),
                p_opt(OBJECTS_PART),
                p(STATUS_PART),
                p(DESCR_PART),
                p_opt(REFER_PART),
            ],
        ),
    )?;

    add(ProductionPattern::new(SNMP_TRAP_TYPE, "SnmpTrapType").with_alternative(vec![
        t(tk::TRAP_TYPE),
        p(ENTERPRISE_PART),
        p_opt(VARIABLES_PART),
        p_opt(DESCR_PART),
        p_opt(REFER_PART),
    ]))?;

    add(
        ProductionPattern::new(SNMP_TEXTUAL_CONVENTION, "SnmpTextualConvention").with_alternative(
            vec![
                t(tk::TEXTUAL_CONVENTION),
                p_opt(DISPLAY_PART),
                p(STATUS_PART),
                p(DESCR_PART),
                p_opt(REFER_PART),
                p(SYNTAX_PART),
            ],
        ),
    )?;

    add(ProductionPattern::new(SNMP_OBJECT_GROUP, "SnmpObjectGroup").with_alternative(vec![
        t(tk::OBJECT_GROUP),
        p(OBJECTS_PART),
        p(STATUS_PART),
        p(DESCR_PART),
        p_opt(REFER_PART),
    ]))?;

    add(
        ProductionPattern::new(SNMP_NOTIFICATION_GROUP, "SnmpNotificationGroup").with_alternative(
            vec![
                t(tk::NOTIFICATION_GROUP),
                p(NOTIFICATIONS_PART),
                p(STATUS_PART),
                p(DESCR_PART),
                p_opt(REFER_PART),
            ],
        ),
    )?;

    add(
        ProductionPattern::new(SNMP_MODULE_COMPLIANCE, "SnmpModuleCompliance").with_alternative(
            vec![
                t(tk::MODULE_COMPLIANCE),
                p(STATUS_PART),
                p(DESCR_PART),
                p_opt(REFER_PART),
                p_plus(MODULE_PART),
            ],
        ),
    )?;

    add(
        ProductionPattern::new(SNMP_AGENT_CAPABILITIES, "SnmpAgentCapabilities").with_alternative(
            vec![
                t(tk::AGENT_CAPABILITIES),
                p(PRODUCT_RELEASE_PART),
                p(STATUS_PART),
                p(DESCR_PART),
                p_opt(REFER_PART),
                p_star(MODULE_SUPPORT_PART),
            ],
        ),
    )?;

    add(ProductionPattern::new(SYNTAX_PART, "SyntaxPart")
        .with_alternative(vec![t(tk::SYNTAX), p(TYPE)]))?;

    add(ProductionPattern::new(UNITS_PART, "UnitsPart")
        .with_alternative(vec![t(tk::UNITS), t(tk::QUOTED)]))?;

    let mut access_part = ProductionPattern::new(ACCESS_PART, "AccessPart");
    access_part.add_alternative(alt(vec![t(tk::MAX_ACCESS), t(tk::IDENT)]));
    access_part.add_alternative(alt(vec![t(tk::ACCESS), t(tk::IDENT)]));
    add(access_part)?;

    add(ProductionPattern::new(STATUS_PART, "StatusPart")
        .with_alternative(vec![t(tk::STATUS), t(tk::IDENT)]))?;

    add(ProductionPattern::new(DESCR_PART, "DescriptionPart")
        .with_alternative(vec![t(tk::DESCRIPTION), t(tk::QUOTED)]))?;

    add(ProductionPattern::new(REFER_PART, "ReferencePart")
        .with_alternative(vec![t(tk::REFERENCE), t(tk::QUOTED)]))?;

    let mut index_part = ProductionPattern::new(INDEX_PART, "IndexPart");
    index_part.add_alternative(alt(vec![
        t(tk::INDEX),
        t(tk::LBRACE),
        p(INDEX_LIST),
        t(tk::RBRACE),
    ]));
    index_part.add_alternative(alt(vec![
        t(tk::AUGMENTS),
        t(tk::LBRACE),
        t(tk::IDENT),
        t(tk::RBRACE),
    ]));
    add(index_part)?;

    add(ProductionPattern::new(INDEX_LIST, "IndexList")
        .with_alternative(vec![p(INDEX_ITEM), p_star(INDEX_REST)]))?;

    add(ProductionPattern::new(INDEX_REST, "IndexRest")
        .synthetic()
        .with_alternative(vec![t(tk::COMMA), p(INDEX_ITEM)]))?;

    add(ProductionPattern::new(INDEX_ITEM, "IndexItem")
        .with_alternative(vec![t_opt(tk::IMPLIED), t(tk::IDENT)]))?;

    add(ProductionPattern::new(DEFVAL_PART, "DefValPart").with_alternative(vec![
        t(tk::DEFVAL),
        t(tk::LBRACE),
        p(VALUE),
        t(tk::RBRACE),
    ]))?;

    add(ProductionPattern::new(OBJECTS_PART, "ObjectsPart").with_alternative(vec![
        t(tk::OBJECTS),
        t(tk::LBRACE),
        p(NAME_LIST),
        t(tk::RBRACE),
    ]))?;

    add(
        ProductionPattern::new(NOTIFICATIONS_PART, "NotificationsPart").with_alternative(vec![
            t(tk::NOTIFICATIONS),
            t(tk::LBRACE),
            p(NAME_LIST),
            t(tk::RBRACE),
        ]),
    )?;

    add(ProductionPattern::new(VARIABLES_PART, "VariablesPart").with_alternative(vec![
        t(tk::VARIABLES),
        t(tk::LBRACE),
        p(NAME_LIST),
        t(tk::RBRACE),
    ]))?;

    add(ProductionPattern::new(NAME_LIST, "NameList")
        .with_alternative(vec![t(tk::IDENT), p_star(NAME_REST)]))?;

    add(ProductionPattern::new(NAME_REST, "NameRest")
        .synthetic()
        .with_alternative(vec![t(tk::COMMA), t(tk::IDENT)]))?;

    add(ProductionPattern::new(ENTERPRISE_PART, "EnterprisePart")
        .with_alternative(vec![t(tk::ENTERPRISE), p(VALUE)]))?;

    add(ProductionPattern::new(DISPLAY_PART, "DisplayPart")
        .with_alternative(vec![t(tk::DISPLAY_HINT), t(tk::QUOTED)]))?;

    add(ProductionPattern::new(LAST_UPDATED_PART, "LastUpdatedPart")
        .with_alternative(vec![t(tk::LAST_UPDATED), t(tk::QUOTED)]))?;

    add(ProductionPattern::new(ORGANIZATION_PART, "OrganizationPart")
        .with_alternative(vec![t(tk::ORGANIZATION), t(tk::QUOTED)]))?;

    add(ProductionPattern::new(CONTACT_PART, "ContactPart")
        .with_alternative(vec![t(tk::CONTACT_INFO), t(tk::QUOTED)]))?;

    add(ProductionPattern::new(REVISION_PART, "RevisionPart").with_alternative(vec![
        t(tk::REVISION),
        t(tk::QUOTED),
        p(DESCR_PART),
    ]))?;

    add(ProductionPattern::new(MODULE_PART, "ModulePart").with_alternative(vec![
        t(tk::MODULE),
        p_opt(MODULE_NAME_PART),
        p_opt(MANDATORY_PART),
        p_star(COMPLIANCE_PART),
    ]))?;

    add(ProductionPattern::new(MODULE_NAME_PART, "ModuleNamePart")
        .with_alternative(vec![t(tk::IDENT)]))?;

    add(ProductionPattern::new(MANDATORY_PART, "MandatoryPart").with_alternative(vec![
        t(tk::MANDATORY_GROUPS),
        t(tk::LBRACE),
        p(NAME_LIST),
        t(tk::RBRACE),
    ]))?;

    let mut compliance = ProductionPattern::new(COMPLIANCE_PART, "CompliancePart");
    compliance.add_alternative(alt(vec![p(COMPLIANCE_GROUP)]));
    compliance.add_alternative(alt(vec![p(COMPLIANCE_OBJECT)]));
    add(compliance)?;

    add(ProductionPattern::new(COMPLIANCE_GROUP, "ComplianceGroup").with_alternative(vec![
        t(tk::GROUP),
        t(tk::IDENT),
        p(DESCR_PART),
    ]))?;

    add(
        ProductionPattern::new(COMPLIANCE_OBJECT, "ComplianceObject").with_alternative(vec![
            t(tk::OBJECT),
            t(tk::IDENT),
            p_opt(SYNTAX_PART),
            p_opt(WRITE_SYNTAX_PART),
            p_opt(MIN_ACCESS_PART),
            p_opt(DESCR_PART),
        ]),
    )?;

    add(ProductionPattern::new(WRITE_SYNTAX_PART, "WriteSyntaxPart")
        .with_alternative(vec![t(tk::WRITE_SYNTAX), p(TYPE)]))?;

    add(ProductionPattern::new(MIN_ACCESS_PART, "MinAccessPart")
        .with_alternative(vec![t(tk::MIN_ACCESS), t(tk::IDENT)]))?;

    add(
        ProductionPattern::new(PRODUCT_RELEASE_PART, "ProductReleasePart")
            .with_alternative(vec![t(tk::PRODUCT_RELEASE), t(tk::QUOTED)]),
    )?;

    add(
        ProductionPattern::new(MODULE_SUPPORT_PART, "ModuleSupportPart").with_alternative(vec![
            t(tk::SUPPORTS),
            t(tk::IDENT),
            t(tk::INCLUDES),
            t(tk::LBRACE),
            p(NAME_LIST),
            t(tk::RBRACE),
            p_star(VARIATION_PART),
        ]),
    )?;

    add(ProductionPattern::new(VARIATION_PART, "VariationPart").with_alternative(vec![
        t(tk::VARIATION),
        t(tk::IDENT),
        p_opt(SYNTAX_PART),
        p_opt(WRITE_SYNTAX_PART),
        p_opt(ACCESS_PART),
        p_opt(CREATION_PART),
        p_opt(DEFVAL_PART),
        p(DESCR_PART),
    ]))?;

    add(ProductionPattern::new(CREATION_PART, "CreationPart").with_alternative(vec![
        t(tk::CREATION_REQUIRES),
        t(tk::LBRACE),
        p(NAME_LIST),
        t(tk::RBRACE),
    ]))?;

    Ok(())
}

fn alt(elements: Vec<E>) -> grammib_parse::ProductionAlternative {
    grammib_parse::ProductionAlternative::from_elements(elements)
}

/// Build a ready-to-prepare SMI parser over the given source text.
pub fn build_parser(text: &str) -> Result<Parser, GrammarError> {
    let mut tokenizer = Tokenizer::from_text(text);
    tokenizer.set_keep_token_list(true);
    register_tokens(&mut tokenizer)?;
    let mut parser = Parser::new(tokenizer);
    register_productions(&mut parser)?;
    parser.prepare()?;
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammib_parse::TreeBuilder;

    #[test]
    fn test_grammar_prepares_cleanly() {
        build_parser("").unwrap();
    }

    #[test]
    fn test_keyword_wins_over_identifier() {
        let mut tokenizer = Tokenizer::from_text("OBJECT-TYPE OBJECT-TYPES");
        register_tokens(&mut tokenizer).unwrap();
        let first = tokenizer.next().unwrap().unwrap();
        assert_eq!(first.id, token::OBJECT_TYPE);
        // The longer identifier outgrows the keyword.
        let second = tokenizer.next().unwrap().unwrap();
        assert_eq!(second.id, token::IDENT);
        assert_eq!(second.image, "OBJECT-TYPES");
    }

    #[test]
    fn test_comment_separator_lines() {
        let mut tokenizer =
            Tokenizer::from_text("-- header\n----------------\nfoo -- trailing -- END");
        register_tokens(&mut tokenizer).unwrap();
        let first = tokenizer.next().unwrap().unwrap();
        assert_eq!((first.id, first.image.as_str()), (token::IDENT, "foo"));
        // "-- trailing --" closes before END, which is live code.
        let second = tokenizer.next().unwrap().unwrap();
        assert_eq!(second.id, token::END);
        assert!(tokenizer.next().unwrap().is_none());
    }

    #[test]
    fn test_hyphenated_identifier() {
        let mut tokenizer = Tokenizer::from_text("mib-2 sysUpTime-- c");
        register_tokens(&mut tokenizer).unwrap();
        let first = tokenizer.next().unwrap().unwrap();
        assert_eq!(first.image, "mib-2");
        // The double hyphen stays out of the identifier and opens a comment.
        let second = tokenizer.next().unwrap().unwrap();
        assert_eq!(second.image, "sysUpTime");
        assert!(tokenizer.next().unwrap().is_none());
    }

    #[test]
    fn test_parse_minimal_module() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
                    testRoot OBJECT IDENTIFIER ::= { iso 42 }\n\
                    END\n";
        let mut parser = build_parser(text).unwrap();
        let tree: grammib_parse::Node<()> = parser.parse(&mut TreeBuilder).unwrap();
        assert_eq!(tree.name(), "Start");
    }

    #[test]
    fn test_parse_object_type() {
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
                    testObj OBJECT-TYPE\n\
                        SYNTAX INTEGER { up(1), down(2) }\n\
                        ACCESS read-only\n\
                        STATUS mandatory\n\
                        DESCRIPTION \"A test object.\"\n\
                        ::= { testRoot 1 }\n\
                    END\n";
        let mut parser = build_parser(text).unwrap();
        let tree: grammib_parse::Node<()> = parser.parse(&mut TreeBuilder).unwrap();
        assert_eq!(tree.children().len(), 1);
    }

    #[test]
    fn test_parse_macro_definition_is_skimmed() {
        let text = "RFC-1212 DEFINITIONS ::= BEGIN\n\
                    OBJECT-TYPE MACRO ::= BEGIN\n\
                        TYPE NOTATION ::= \"SYNTAX\" type(TYPE ObjectSyntax)\n\
                        VALUE NOTATION ::= value(VALUE ObjectName)\n\
                    END\n\
                    END\n";
        let mut parser = build_parser(text).unwrap();
        let tree: grammib_parse::Node<()> = parser.parse(&mut TreeBuilder).unwrap();
        assert_eq!(tree.children().len(), 1);
    }

    #[test]
    fn test_parse_tagged_type_assignment() {
        let text = "RFC1155-SMI DEFINITIONS ::= BEGIN\n\
                    Counter ::= [APPLICATION 1] IMPLICIT INTEGER (0..4294967295)\n\
                    NetworkAddress ::= CHOICE { internet IpAddress }\n\
                    IpAddress ::= [APPLICATION 0] IMPLICIT OCTET STRING (SIZE (4))\n\
                    END\n";
        let mut parser = build_parser(text).unwrap();
        let tree: grammib_parse::Node<()> = parser.parse(&mut TreeBuilder).unwrap();
        assert_eq!(tree.children().len(), 1);
    }
}
