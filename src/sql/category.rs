//! Hierarchical token categories.
//!
//! Every token produced by the lexer carries one `Category`. Categories form a
//! dotted hierarchy (`Keyword.DML` is a `Keyword`, `String.Single` is a
//! `String` which is a `Literal`), queried with [`Category::is_a`]. Equality
//! (`==`) is the exact match; `is_a` is the prefix match.
//!
//! The set is closed: it mirrors what the pattern table can emit, plus the
//! intermediate parents needed for hierarchical queries.

/// Classification of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Category {
    #[display("Text")]
    Text,
    #[display("Text.Whitespace")]
    Whitespace,
    #[display("Error")]
    Error,
    #[display("Keyword")]
    Keyword,
    #[display("Keyword.DML")]
    KeywordDml,
    #[display("Keyword.DDL")]
    KeywordDdl,
    #[display("Keyword.CTE")]
    KeywordCte,
    #[display("Keyword.Order")]
    KeywordOrder,
    #[display("Keyword.TZCast")]
    KeywordTzCast,
    #[display("Keyword.Command")]
    Command,
    #[display("Name")]
    Name,
    #[display("Name.Builtin")]
    NameBuiltin,
    #[display("Name.Placeholder")]
    NamePlaceholder,
    #[display("Literal")]
    Literal,
    #[display("Literal.String")]
    String,
    #[display("Literal.String.Single")]
    StringSingle,
    #[display("Literal.String.Symbol")]
    StringSymbol,
    #[display("Literal.Number")]
    Number,
    #[display("Literal.Number.Integer")]
    NumberInteger,
    #[display("Literal.Number.Float")]
    NumberFloat,
    #[display("Literal.Number.Hexadecimal")]
    NumberHexadecimal,
    #[display("Punctuation")]
    Punctuation,
    #[display("Operator")]
    Operator,
    #[display("Operator.Comparison")]
    Comparison,
    #[display("Wildcard")]
    Wildcard,
    #[display("Comment")]
    Comment,
    #[display("Comment.Single")]
    CommentSingle,
    #[display("Comment.Single.Hint")]
    CommentSingleHint,
    #[display("Comment.Multiline")]
    CommentMultiline,
    #[display("Comment.Multiline.Hint")]
    CommentMultilineHint,
    #[display("Assignment")]
    Assignment,
}

impl Category {
    /// Immediate ancestor, `None` for the top-level categories.
    pub const fn parent(self) -> Option<Self> {
        use Category::*;
        match self {
            Whitespace => Some(Text),
            KeywordDml | KeywordDdl | KeywordCte | KeywordOrder | KeywordTzCast | Command => {
                Some(Keyword)
            }
            NameBuiltin | NamePlaceholder => Some(Name),
            String | Number => Some(Literal),
            StringSingle | StringSymbol => Some(String),
            NumberInteger | NumberFloat | NumberHexadecimal => Some(Number),
            Comparison => Some(Operator),
            CommentSingle | CommentMultiline => Some(Comment),
            CommentSingleHint => Some(CommentSingle),
            CommentMultilineHint => Some(CommentMultiline),
            Text | Error | Keyword | Name | Literal | Punctuation | Operator | Wildcard
            | Comment | Assignment => None,
        }
    }

    /// Hierarchical match: true if `self` is `ancestor` or descends from it.
    pub fn is_a(self, ancestor: Self) -> bool {
        let mut current = Some(self);
        while let Some(category) = current {
            if category == ancestor {
                return true;
            }
            current = category.parent();
        }
        false
    }

    pub fn is_keyword(self) -> bool {
        self.is_a(Category::Keyword)
    }

    pub fn is_whitespace(self) -> bool {
        self.is_a(Category::Whitespace)
    }

    pub fn is_comment(self) -> bool {
        self.is_a(Category::Comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Category::KeywordDml, Category::Keyword, true)]
    #[case(Category::Keyword, Category::KeywordDml, false)]
    #[case(Category::StringSingle, Category::Literal, true)]
    #[case(Category::NumberFloat, Category::Number, true)]
    #[case(Category::NumberFloat, Category::String, false)]
    #[case(Category::CommentSingleHint, Category::Comment, true)]
    #[case(Category::Comparison, Category::Operator, true)]
    #[case(Category::Whitespace, Category::Text, true)]
    #[case(Category::Name, Category::Name, true)]
    fn hierarchy(#[case] category: Category, #[case] ancestor: Category, #[case] expected: bool) {
        assert_eq!(category.is_a(ancestor), expected);
    }

    #[test]
    fn dotted_display() {
        assert_eq!(Category::KeywordDml.to_string(), "Keyword.DML");
        assert_eq!(Category::StringSymbol.to_string(), "Literal.String.Symbol");
        assert_eq!(Category::Whitespace.to_string(), "Text.Whitespace");
    }

    #[test]
    fn command_is_keyword() {
        assert!(Category::Command.is_keyword());
        assert!(!Category::NameBuiltin.is_keyword());
    }
}
