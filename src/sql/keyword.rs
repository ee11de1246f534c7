//! Keyword dictionaries consulted by the lexer's word rule.
//!
//! A word that matches no dictionary is a `Name`. Dictionaries are searched in
//! order and the first hit wins, so a later dictionary can only add words, not
//! reclassify them.
//!
//! Design notes:
//! - The built-in table is built once (`LazyLock`) and shared by reference;
//!   lexers configured with extra keywords hold an owned, extended copy.
//! - Lookups upper-case the word once; dictionary keys are stored upper-case.
use crate::sql::category::Category;
use crate::*;
use std::collections::HashMap;
use std::sync::LazyLock;

use Category::{
    Keyword as K, KeywordCte as CTE, KeywordDdl as DDL, KeywordDml as DML, KeywordOrder as ORD,
    NameBuiltin as B,
};

/// Keywords shared by every dialect.
const COMMON: &[(&str, Category)] = &[
    ("SELECT", DML),
    ("INSERT", DML),
    ("DELETE", DML),
    ("UPDATE", DML),
    ("UPSERT", DML),
    ("REPLACE", DML),
    ("MERGE", DML),
    ("DROP", DDL),
    ("CREATE", DDL),
    ("ALTER", DDL),
    ("TRUNCATE", DDL),
    ("WITH", CTE),
    ("ASC", ORD),
    ("DESC", ORD),
    ("WHERE", K),
    ("FROM", K),
    ("INNER", K),
    ("JOIN", K),
    ("STRAIGHT_JOIN", K),
    ("AND", K),
    ("OR", K),
    ("LIKE", K),
    ("ON", K),
    ("IN", K),
    ("SET", K),
    ("BY", K),
    ("GROUP", K),
    ("ORDER", K),
    ("LEFT", K),
    ("OUTER", K),
    ("FULL", K),
    ("IF", K),
    ("END", K),
    ("THEN", K),
    ("LOOP", K),
    ("AS", K),
    ("ELSE", K),
    ("FOR", K),
    ("WHILE", K),
    ("CASE", K),
    ("WHEN", K),
    ("MIN", K),
    ("MAX", K),
    ("DISTINCT", K),
];

/// The general SQL keyword set.
const GENERAL: &[(&str, Category)] = &[
    ("ABORT", K),
    ("ABSOLUTE", K),
    ("ACCESS", K),
    ("ACTION", K),
    ("ADD", K),
    ("ADMIN", K),
    ("AFTER", K),
    ("AGGREGATE", K),
    ("ALL", K),
    ("ALWAYS", K),
    ("ANALYSE", K),
    ("ANALYZE", K),
    ("ANY", K),
    ("ARRAY", K),
    ("ASENSITIVE", K),
    ("ASSERTION", K),
    ("ASSIGNMENT", K),
    ("ASYMMETRIC", K),
    ("AT", K),
    ("ATOMIC", K),
    ("AUTHORIZATION", K),
    ("AUTO_INCREMENT", K),
    ("AVG", K),
    ("BACKWARD", K),
    ("BEFORE", K),
    ("BEGIN", K),
    ("BETWEEN", K),
    ("BOTH", K),
    ("BREADTH", K),
    ("CACHE", K),
    ("CALL", K),
    ("CALLED", K),
    ("CARDINALITY", K),
    ("CASCADE", K),
    ("CASCADED", K),
    ("CAST", K),
    ("CATALOG", K),
    ("CHAIN", K),
    ("CHARACTERISTICS", K),
    ("CHECK", K),
    ("CHECKPOINT", K),
    ("CLASS", K),
    ("CLOSE", K),
    ("CLUSTER", K),
    ("COALESCE", K),
    ("COLLATE", K),
    ("COLLATION", K),
    ("COLUMN", K),
    ("COLUMNS", K),
    ("COMMENT", K),
    ("COMMIT", K),
    ("COMMITTED", K),
    ("CONCURRENTLY", K),
    ("CONDITION", K),
    ("CONNECT", K),
    ("CONNECTION", K),
    ("CONSTRAINT", K),
    ("CONSTRAINTS", K),
    ("CONTINUE", K),
    ("CONVERSION", K),
    ("COPY", K),
    ("COST", K),
    ("COUNT", K),
    ("CROSS", K),
    ("CSV", K),
    ("CUBE", K),
    ("CURRENT", K),
    ("CURRENT_DATE", K),
    ("CURRENT_PATH", K),
    ("CURRENT_ROLE", K),
    ("CURRENT_TIME", K),
    ("CURRENT_TIMESTAMP", K),
    ("CURRENT_USER", K),
    ("CURSOR", K),
    ("CYCLE", K),
    ("DATA", K),
    ("DATABASE", K),
    ("DAY", K),
    ("DEALLOCATE", K),
    ("DECLARE", K),
    ("DEFAULT", K),
    ("DEFAULTS", K),
    ("DEFERRABLE", K),
    ("DEFERRED", K),
    ("DEFINER", K),
    ("DELIMITER", K),
    ("DELIMITERS", K),
    ("DEPTH", K),
    ("DESCRIBE", K),
    ("DETERMINISTIC", K),
    ("DIAGNOSTICS", K),
    ("DICTIONARY", K),
    ("DISABLE", K),
    ("DISCONNECT", K),
    ("DO", K),
    ("DOMAIN", K),
    ("EACH", K),
    ("ELSIF", K),
    ("ENABLE", K),
    ("ENCODING", K),
    ("ENCRYPTED", K),
    ("ENGINE", K),
    ("ESCAPE", K),
    ("EVERY", K),
    ("EXCEPT", K),
    ("EXCEPTION", K),
    ("EXCLUDING", K),
    ("EXCLUSIVE", K),
    ("EXEC", K),
    ("EXECUTE", K),
    ("EXISTS", K),
    ("EXIT", K),
    ("EXPLAIN", K),
    ("EXTERNAL", K),
    ("EXTRACT", K),
    ("FALSE", K),
    ("FETCH", K),
    ("FILTER", K),
    ("FINAL", K),
    ("FIRST", K),
    ("FOLLOWING", K),
    ("FORCE", K),
    ("FOREACH", K),
    ("FOREIGN", K),
    ("FORWARD", K),
    ("FOUND", K),
    ("FREEZE", K),
    ("FUNCTION", K),
    ("FUNCTIONS", K),
    ("GENERATED", K),
    ("GET", K),
    ("GLOBAL", K),
    ("GO", K),
    ("GOTO", K),
    ("GRANT", K),
    ("GRANTED", K),
    ("GROUPING", K),
    ("HANDLER", K),
    ("HAVING", K),
    ("HOLD", K),
    ("HOUR", K),
    ("IDENTITY", K),
    ("IGNORE", K),
    ("ILIKE", K),
    ("IMMEDIATE", K),
    ("IMMUTABLE", K),
    ("IMPLICIT", K),
    ("INCLUDING", K),
    ("INCREMENT", K),
    ("INDEX", K),
    ("INDEXES", K),
    ("INHERIT", K),
    ("INHERITS", K),
    ("INITIALLY", K),
    ("INOUT", K),
    ("INPUT", K),
    ("INSENSITIVE", K),
    ("INSTEAD", K),
    ("INTERSECT", K),
    ("INTO", K),
    ("INVOKER", K),
    ("IS", K),
    ("ISNULL", K),
    ("ISOLATION", K),
    ("ITERATE", K),
    ("KEY", K),
    ("LANGUAGE", K),
    ("LARGE", K),
    ("LAST", K),
    ("LATERAL", K),
    ("LEADING", K),
    ("LEAVE", K),
    ("LEVEL", K),
    ("LIMIT", K),
    ("LISTEN", K),
    ("LOAD", K),
    ("LOCAL", K),
    ("LOCATION", K),
    ("LOCK", K),
    ("MATCH", K),
    ("MATCHED", K),
    ("MATERIALIZED", K),
    ("MAXVALUE", K),
    ("MINUTE", K),
    ("MINVALUE", K),
    ("MODE", K),
    ("MODIFIES", K),
    ("MODIFY", K),
    ("MONTH", K),
    ("MOVE", K),
    ("NAMES", K),
    ("NATIONAL", K),
    ("NATURAL", K),
    ("NEW", K),
    ("NEXT", K),
    ("NO", K),
    ("NOCREATEDB", K),
    ("NOCREATEUSER", K),
    ("NONE", K),
    ("NOT", K),
    ("NOTHING", K),
    ("NOTIFY", K),
    ("NOTNULL", K),
    ("NOWAIT", K),
    ("NULL", K),
    ("NULLIF", K),
    ("NULLS", K),
    ("OF", K),
    ("OFF", K),
    ("OFFSET", K),
    ("OIDS", K),
    ("OLD", K),
    ("ONLY", K),
    ("OPEN", K),
    ("OPERATOR", K),
    ("OPTION", K),
    ("OPTIONS", K),
    ("ORDINALITY", K),
    ("OUT", K),
    ("OUTPUT", K),
    ("OVER", K),
    ("OVERLAPS", K),
    ("OVERLAY", K),
    ("OVERRIDING", K),
    ("OWNER", K),
    ("PARALLEL", K),
    ("PARTIAL", K),
    ("PARTITION", K),
    ("PASSWORD", K),
    ("PLACING", K),
    ("POSITION", K),
    ("PRECEDING", K),
    ("PREPARE", K),
    ("PRESERVE", K),
    ("PRIMARY", K),
    ("PRIOR", K),
    ("PRIVILEGES", K),
    ("PROCEDURAL", K),
    ("PROCEDURE", K),
    ("PUBLIC", K),
    ("RAISE", K),
    ("RANGE", K),
    ("READ", K),
    ("READS", K),
    ("RECHECK", K),
    ("RECURSIVE", K),
    ("REF", K),
    ("REFERENCES", K),
    ("REFERENCING", K),
    ("REFRESH", K),
    ("REINDEX", K),
    ("RELATIVE", K),
    ("RELEASE", K),
    ("RENAME", K),
    ("REPEATABLE", K),
    ("RESET", K),
    ("RESTART", K),
    ("RESTRICT", K),
    ("RESULT", K),
    ("RETURN", K),
    ("RETURNING", K),
    ("RETURNS", K),
    ("REVOKE", K),
    ("RIGHT", K),
    ("ROLE", K),
    ("ROLLBACK", K),
    ("ROLLUP", K),
    ("ROUTINE", K),
    ("ROW", K),
    ("ROWS", K),
    ("RULE", K),
    ("SAVEPOINT", K),
    ("SCHEMA", K),
    ("SCROLL", K),
    ("SEARCH", K),
    ("SECOND", K),
    ("SECURITY", K),
    ("SEQUENCE", K),
    ("SERIALIZABLE", K),
    ("SESSION", K),
    ("SESSION_USER", K),
    ("SETOF", K),
    ("SETS", K),
    ("SHARE", K),
    ("SHOW", K),
    ("SIMILAR", K),
    ("SIMPLE", K),
    ("SOME", K),
    ("STABLE", K),
    ("START", K),
    ("STATEMENT", K),
    ("STATISTICS", K),
    ("STDIN", K),
    ("STDOUT", K),
    ("STORAGE", K),
    ("STRICT", K),
    ("SUBSTRING", K),
    ("SUM", K),
    ("SYMMETRIC", K),
    ("SYSID", K),
    ("SYSTEM", K),
    ("SYSTEM_USER", K),
    ("TABLE", K),
    ("TABLES", K),
    ("TABLESPACE", K),
    ("TEMP", K),
    ("TEMPLATE", K),
    ("TEMPORARY", K),
    ("TIES", K),
    ("TO", K),
    ("TRAILING", K),
    ("TRANSACTION", K),
    ("TREAT", K),
    ("TRIGGER", K),
    ("TRIM", K),
    ("TRUE", K),
    ("TRUSTED", K),
    ("TYPE", K),
    ("UNBOUNDED", K),
    ("UNCOMMITTED", K),
    ("UNDER", K),
    ("UNION", K),
    ("UNIQUE", K),
    ("UNKNOWN", K),
    ("UNLISTEN", K),
    ("UNLOGGED", K),
    ("UNNEST", K),
    ("UNTIL", K),
    ("USAGE", K),
    ("USE", K),
    ("USER", K),
    ("USING", K),
    ("VACUUM", K),
    ("VALID", K),
    ("VALIDATOR", K),
    ("VALUE", K),
    ("VALUES", K),
    ("VARIADIC", K),
    ("VERBOSE", K),
    ("VERSION", K),
    ("VIEW", K),
    ("VIEWS", K),
    ("VOLATILE", K),
    ("WINDOW", K),
    ("WITHIN", K),
    ("WITHOUT", K),
    ("WORK", K),
    ("WRITE", K),
    ("YEAR", K),
    ("ZONE", K),
    // data types
    ("BIGINT", B),
    ("BINARY", B),
    ("BIT", B),
    ("BLOB", B),
    ("BOOLEAN", B),
    ("BOOL", B),
    ("BYTEA", B),
    ("CHAR", B),
    ("CHARACTER", B),
    ("DATE", B),
    ("DATETIME", B),
    ("DEC", B),
    ("DECIMAL", B),
    ("FLOAT", B),
    ("INT", B),
    ("INT2", B),
    ("INT4", B),
    ("INT8", B),
    ("INTEGER", B),
    ("INTERVAL", B),
    ("JSON", B),
    ("JSONB", B),
    ("LONG", B),
    ("MEDIUMINT", B),
    ("NCHAR", B),
    ("NUMBER", B),
    ("NUMERIC", B),
    ("NVARCHAR", B),
    ("REAL", B),
    ("SERIAL", B),
    ("SERIAL8", B),
    ("SIGNED", B),
    ("SMALLINT", B),
    ("TEXT", B),
    ("TIME", B),
    ("TIMESTAMP", B),
    ("TINYINT", B),
    ("UNSIGNED", B),
    ("UUID", B),
    ("VARBINARY", B),
    ("VARCHAR", B),
    ("VARCHAR2", B),
    ("VARYING", B),
];

const ORACLE: &[(&str, Category)] = &[
    ("ARCHIVE", K),
    ("ARCHIVELOG", K),
    ("BACKUP", K),
    ("BECOME", K),
    ("BLOCK", K),
    ("BODY", K),
    ("COMPILE", K),
    ("CONTENTS", K),
    ("CONTROLFILE", K),
    ("DATAFILE", K),
    ("DISMOUNT", K),
    ("DUMP", K),
    ("EVENTS", K),
    ("EXTENT", K),
    ("FREELIST", K),
    ("FREELISTS", K),
    ("INITRANS", K),
    ("LAYER", K),
    ("LOGFILE", K),
    ("MANAGE", K),
    ("MAXTRANS", K),
    ("MINEXTENTS", K),
    ("MOUNT", K),
    ("NOARCHIVELOG", K),
    ("NOCACHE", K),
    ("NOCYCLE", K),
    ("NOMAXVALUE", K),
    ("NOMINVALUE", K),
    ("NOORDER", K),
    ("PACKAGE", K),
    ("PCTFREE", K),
    ("PCTINCREASE", K),
    ("PCTUSED", K),
    ("PLAN", K),
    ("PRIVATE", K),
    ("PROFILE", K),
    ("QUOTA", K),
    ("RECOVER", K),
    ("RESETLOGS", K),
    ("RESTRICTED", K),
    ("REUSE", K),
    ("ROLES", K),
    ("SEGMENT", K),
    ("SNAPSHOT", K),
    ("SWITCH", K),
    ("TABLESPACES", K),
    ("THREAD", K),
    ("TRACING", K),
    ("TRANSACTIONAL", K),
    ("UNLIMITED", K),
    ("ROWNUM", B),
    ("ROWID", B),
    ("SYSDATE", B),
    ("VARCHAR2", B),
    ("CLOB", B),
    ("NCLOB", B),
    ("SYS_REFCURSOR", B),
];

const PLPGSQL: &[(&str, Category)] = &[
    ("CONFLICT", K),
    ("WINDOW", K),
    ("PARTITION", K),
    ("OVER", K),
    ("PERFORM", K),
    ("NOTICE", K),
    ("PLPGSQL", K),
    ("INHERIT", K),
    ("INDEXES", K),
    ("ON_ERROR_STOP", K),
    ("BYTEA", K),
    ("BIGSERIAL", K),
    ("BOX", K),
    ("CHARACTER", K),
    ("CIDR", K),
    ("CIRCLE", K),
    ("INET", K),
    ("LINE", K),
    ("LSEG", K),
    ("MACADDR", K),
    ("MONEY", K),
    ("PATH", K),
    ("PG_LSN", K),
    ("POINT", K),
    ("POLYGON", K),
    ("SMALLSERIAL", K),
    ("TSQUERY", K),
    ("TSVECTOR", K),
    ("TXID_SNAPSHOT", K),
    ("XML", K),
];

const MYSQL: &[(&str, Category)] = &[
    ("ALGORITHM", K),
    ("AUTO_INCREMENT", K),
    ("CHARSET", K),
    ("DUAL", K),
    ("ENUM", B),
    ("FULLTEXT", K),
    ("LONGTEXT", B),
    ("MEDIUMTEXT", B),
    ("REGEXP", K),
    ("SHOW", K),
    ("SPATIAL", K),
    ("STRAIGHT_JOIN", K),
    ("TINYTEXT", B),
    ("ZEROFILL", K),
];

type Dictionary = HashMap<String, Category>;

fn dictionary(entries: &[(&str, Category)]) -> Dictionary {
    entries
        .iter()
        .map(|(word, category)| (word.to_string(), *category))
        .collect()
}

/// Ordered keyword dictionaries.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    dictionaries: Vec<Dictionary>,
}

static GENERIC: LazyLock<KeywordTable> =
    LazyLock::new(|| KeywordTable::from_lists(&[COMMON, GENERAL, ORACLE, PLPGSQL]));
static POSTGRES: LazyLock<KeywordTable> =
    LazyLock::new(|| KeywordTable::from_lists(&[COMMON, GENERAL, PLPGSQL]));
static MYSQL_TABLE: LazyLock<KeywordTable> =
    LazyLock::new(|| KeywordTable::from_lists(&[COMMON, GENERAL, MYSQL]));

impl KeywordTable {
    fn from_lists(lists: &[&[(&str, Category)]]) -> Self {
        Self {
            dictionaries: lists.iter().map(|list| dictionary(list)).collect(),
        }
    }

    /// Built-in table shared by all generic-dialect lexers.
    pub fn generic() -> &'static Self {
        &GENERIC
    }

    pub fn postgres() -> &'static Self {
        &POSTGRES
    }

    pub fn mysql() -> &'static Self {
        &MYSQL_TABLE
    }

    /// Copy of this table with one more dictionary holding `words` as plain keywords.
    ///
    /// Every word must be non-empty and lexable as a single word (`\w[$#\w]*`),
    /// otherwise the lexer could never produce it and the list is rejected.
    pub fn with_additional(&self, words: &[String]) -> Result<Self> {
        let mut extra = Dictionary::with_capacity(words.len());
        for word in words {
            if !is_single_word(word) {
                return Err(Error::InvalidKeyword(word.clone()));
            }
            extra.insert(word.to_uppercase(), Category::Keyword);
        }
        debug!(count = extra.len(), "extending keyword table");
        let mut table = self.clone();
        table.dictionaries.push(extra);
        Ok(table)
    }

    /// Category for a lexed word: the first dictionary hit, else `Name`.
    pub fn classify(&self, word: &str) -> Category {
        let upper = word.to_uppercase();
        self.dictionaries
            .iter()
            .find_map(|dictionary| dictionary.get(&upper).copied())
            .unwrap_or(Category::Name)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.classify(word) != Category::Name
    }
}

fn is_single_word(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if is_word_char(first) => chars.all(|c| is_word_char(c) || c == '$' || c == '#'),
        _ => false,
    }
}

/// `\w` in the pattern table: alphanumeric or underscore, Unicode-aware.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
