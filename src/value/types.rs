//! Static vocabulary of the XDM type system (spec §3): the atomic type
//! lattice's tags, `SequenceType`/`ItemType`/`OccurrenceIndicator`, and the
//! resolved qualified name used once namespace prefixes have been bound.
//!
//! Per spec §9 ("Type lattice... do NOT simulate inheritance; use a pair
//! table plus a conformance matrix"), subtype-of and promotion are plain
//! data tables over [`AtomicTypeTag`], implemented in [`crate::value::cast`].

use std::fmt;

/// A namespace-resolved qualified name. Unlike the lexer's [`crate::lexer::NameToken`]
/// (a *prefix*, resolved only at evaluation time against the active
/// namespace bindings), a `QName` always carries an absolute namespace URI
/// (or none, for the null namespace).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub uri: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(uri: Option<String>, local: impl Into<String>) -> QName {
        QName { uri, local: local.into() }
    }

    pub fn no_namespace(local: impl Into<String>) -> QName {
        QName { uri: None, local: local.into() }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uri {
            Some(uri) => write!(f, "{{{}}}{}", uri, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Every atomic type XDM distinguishes (spec §3). Variants are tags, not
/// the carried values themselves — see [`crate::value::atomic::AtomicValue`]
/// for the value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicTypeTag {
    UntypedAtomic,
    String,
    Boolean,
    Decimal,
    Integer,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    PositiveInteger,
    NonPositiveInteger,
    NegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    Float,
    Double,
    Date,
    Time,
    DateTime,
    DateTimeStamp,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
    GYear,
    GMonth,
    GDay,
    GMonthDay,
    GYearMonth,
    AnyUri,
    QName,
    Base64Binary,
    HexBinary,
    Notation,
    NormalizedString,
    Token,
    Language,
    Nmtoken,
    Name,
    NCName,
    Id,
    IdRef,
    Entity,
}

impl AtomicTypeTag {
    /// Looks up a type tag by its unprefixed XSD lexical name
    /// (`"integer"`, `"dateTime"`, `"yearMonthDuration"`, ...), as seen
    /// after a `cast as xs:TYPE` or an `instance of xs:TYPE` test.
    pub fn by_name(name: &str) -> Option<AtomicTypeTag> {
        use AtomicTypeTag::*;
        Some(match name {
            "untypedAtomic" => UntypedAtomic,
            "string" => String,
            "boolean" => Boolean,
            "decimal" => Decimal,
            "integer" => Integer,
            "long" => Long,
            "int" => Int,
            "short" => Short,
            "byte" => Byte,
            "nonNegativeInteger" => NonNegativeInteger,
            "positiveInteger" => PositiveInteger,
            "nonPositiveInteger" => NonPositiveInteger,
            "negativeInteger" => NegativeInteger,
            "unsignedLong" => UnsignedLong,
            "unsignedInt" => UnsignedInt,
            "unsignedShort" => UnsignedShort,
            "unsignedByte" => UnsignedByte,
            "float" => Float,
            "double" => Double,
            "date" => Date,
            "time" => Time,
            "dateTime" => DateTime,
            "dateTimeStamp" => DateTimeStamp,
            "duration" => Duration,
            "yearMonthDuration" => YearMonthDuration,
            "dayTimeDuration" => DayTimeDuration,
            "gYear" => GYear,
            "gMonth" => GMonth,
            "gDay" => GDay,
            "gMonthDay" => GMonthDay,
            "gYearMonth" => GYearMonth,
            "anyURI" => AnyUri,
            "QName" => QName,
            "base64Binary" => Base64Binary,
            "hexBinary" => HexBinary,
            "NOTATION" => Notation,
            "normalizedString" => NormalizedString,
            "token" => Token,
            "language" => Language,
            "NMTOKEN" => Nmtoken,
            "Name" => Name,
            "NCName" => NCName,
            "ID" => Id,
            "IDREF" => IdRef,
            "ENTITY" => Entity,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        use AtomicTypeTag::*;
        match self {
            UntypedAtomic => "untypedAtomic",
            String => "string",
            Boolean => "boolean",
            Decimal => "decimal",
            Integer => "integer",
            Long => "long",
            Int => "int",
            Short => "short",
            Byte => "byte",
            NonNegativeInteger => "nonNegativeInteger",
            PositiveInteger => "positiveInteger",
            NonPositiveInteger => "nonPositiveInteger",
            NegativeInteger => "negativeInteger",
            UnsignedLong => "unsignedLong",
            UnsignedInt => "unsignedInt",
            UnsignedShort => "unsignedShort",
            UnsignedByte => "unsignedByte",
            Float => "float",
            Double => "double",
            Date => "date",
            Time => "time",
            DateTime => "dateTime",
            DateTimeStamp => "dateTimeStamp",
            Duration => "duration",
            YearMonthDuration => "yearMonthDuration",
            DayTimeDuration => "dayTimeDuration",
            GYear => "gYear",
            GMonth => "gMonth",
            GDay => "gDay",
            GMonthDay => "gMonthDay",
            GYearMonth => "gYearMonth",
            AnyUri => "anyURI",
            QName => "QName",
            Base64Binary => "base64Binary",
            HexBinary => "hexBinary",
            Notation => "NOTATION",
            NormalizedString => "normalizedString",
            Token => "token",
            Language => "language",
            Nmtoken => "NMTOKEN",
            Name => "Name",
            NCName => "NCName",
            Id => "ID",
            IdRef => "IDREF",
            Entity => "ENTITY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceIndicator {
    ExactlyOne,
    ZeroOrOne,
    OneOrMore,
    ZeroOrMore,
}

impl OccurrenceIndicator {
    pub fn allows_empty(&self) -> bool {
        matches!(self, OccurrenceIndicator::ZeroOrOne | OccurrenceIndicator::ZeroOrMore)
    }

    pub fn allows_many(&self) -> bool {
        matches!(self, OccurrenceIndicator::OneOrMore | OccurrenceIndicator::ZeroOrMore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTestShape {
    AnyKind,
    Document,
    Element,
    Attribute,
    SchemaElement,
    SchemaAttribute,
    Text,
    Comment,
    ProcessingInstruction,
    NamespaceNode,
}

/// The item half of a `SequenceType` (spec §3): `item()`, a kind test, an
/// atomic type, or one of the 3.0/3.1 function/map/array families. Function,
/// map, and array item types are modeled only at `function(*)`/`map(*)`/
/// `array(*)` granularity — the crate does not check parameter/member
/// signatures of a specific `function(xs:integer) as xs:string`, matching
/// the representative-coverage carve-out in spec.md §4.6 and SPEC_FULL.md §4.6a.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemType {
    Item,
    Kind(KindTestShape),
    Atomic(AtomicTypeTag),
    AnyFunction,
    AnyMap,
    AnyArray,
    /// `empty-sequence()` (spec §3): unlike every other item type, this one
    /// constrains cardinality rather than item shape — it matches only the
    /// empty sequence, regardless of the paired [`OccurrenceIndicator`].
    EmptySequence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceType {
    pub item_type: ItemType,
    pub occurrence: OccurrenceIndicator,
}

impl SequenceType {
    pub fn exactly_one(item_type: ItemType) -> SequenceType {
        SequenceType { item_type, occurrence: OccurrenceIndicator::ExactlyOne }
    }
}
