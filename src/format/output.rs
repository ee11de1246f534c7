//! Output stage: host-language wrapping and final serialization.
use crate::*;
use itertools::Itertools;
use regex::Regex;
use std::sync::OnceLock;

/// Wraps each statement in a Python or PHP string assignment.
///
/// The first statement is assigned to `sql`, later ones to `sql2`, `sql3`, ...
/// A statement spanning several lines becomes one quoted piece per line.
#[derive(Debug)]
pub struct OutputWrapper {
    format: OutputFormat,
    count: usize,
}

impl OutputWrapper {
    /// `None` for plain SQL output.
    pub fn new(format: OutputFormat) -> Option<Self> {
        match format {
            OutputFormat::Sql => None,
            OutputFormat::Python | OutputFormat::Php => Some(Self { format, count: 0 }),
        }
    }

    pub fn wrap(&mut self, statement: &Statement) -> String {
        self.count += 1;
        let base = match self.format {
            OutputFormat::Php => "$sql",
            OutputFormat::Python | OutputFormat::Sql => "sql",
        };
        let varname = match self.count {
            1 => base.to_string(),
            n => format!("{base}{n}"),
        };
        let multiline = statement.to_string().trim().lines().count() > 1;
        // Leading whitespace is the separator from the previous statement.
        let tokens = statement
            .tokens()
            .skip_while(|t| t.is_whitespace())
            .map(|t| (t.is_whitespace(), t.value.as_str()));
        let mut out = String::new();
        if self.count > 1 {
            out.push('\n');
        }
        match self.format {
            OutputFormat::Php => php(&mut out, &varname, multiline, tokens),
            OutputFormat::Python | OutputFormat::Sql => python(&mut out, &varname, multiline, tokens),
        }
        out
    }
}

fn python<'t>(out: &mut String, varname: &str, multiline: bool, tokens: impl Iterator<Item = (bool, &'t str)>) {
    out.push_str(varname);
    out.push_str(" = ");
    if multiline {
        out.push('(');
    }
    out.push('\'');
    for (is_whitespace, value) in tokens {
        match value.split_once('\n') {
            Some((_, after_break)) if is_whitespace => {
                out.push_str(" '\n");
                out.push_str(&" ".repeat(varname.len() + 4));
                out.push('\'');
                out.push_str(after_break);
            }
            _ => out.push_str(&value.replace('\'', "\\'")),
        }
    }
    out.push('\'');
    if multiline {
        out.push(')');
    }
}

fn php<'t>(out: &mut String, varname: &str, multiline: bool, tokens: impl Iterator<Item = (bool, &'t str)>) {
    out.push_str(varname);
    out.push_str(if multiline { "  = \"" } else { " = \"" });
    for (is_whitespace, value) in tokens {
        match value.split_once('\n') {
            Some((_, after_break)) if is_whitespace => {
                out.push_str(" \";\n");
                out.push_str(varname);
                out.push_str(" .= \"");
                out.push_str(after_break);
            }
            _ => out.push_str(&value.replace('"', "\\\"")),
        }
    }
    out.push_str("\";");
}

fn line_splitter() -> Result<&'static Regex> {
    static SPLITTER: OnceLock<Regex> = OnceLock::new();
    if let Some(regex) = SPLITTER.get() {
        return Ok(regex);
    }
    let regex = Regex::new(r#"\r\n|\r|\n|[^\r\n'"]+|"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#)?;
    Ok(SPLITTER.get_or_init(|| regex))
}

/// Split on line breaks that are not inside a quoted string.
pub fn split_unquoted_newlines(text: &str) -> Result<Vec<&str>> {
    let mut lines = Vec::new();
    let mut line_start = 0;
    for hit in line_splitter()?.find_iter(text) {
        if matches!(hit.as_str(), "\r\n" | "\r" | "\n") {
            lines.push(&text[line_start..hit.start()]);
            line_start = hit.end();
        }
    }
    lines.push(&text[line_start..]);
    Ok(lines)
}

/// Final text: every line right-stripped, line breaks inside strings kept.
pub fn serialize(text: &str) -> Result<String> {
    Ok(split_unquoted_newlines(text)?
        .into_iter()
        .map(str::trim_end)
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case("select 1", &["select 1"])]
    #[case("a\nb\r\nc\rd", &["a", "b", "c", "d"])]
    #[case("select 'a\nb'\nfrom t", &["select 'a\nb'", "from t"])]
    #[case("select \"x\ny\" -- 'q\n", &["select \"x\ny\" -- 'q", ""])]
    #[case("it's\nfine", &["it's", "fine"])]
    fn unquoted_newlines(#[case] text: &str, #[case] expected: &[&str]) -> Result {
        assert_eq!(split_unquoted_newlines(text)?, expected);
        Ok(())
    }

    #[test]
    fn serialize_strips_line_ends() -> Result {
        assert_eq!(serialize("select a  \nfrom b \n")?, "select a\nfrom b\n");
        assert_eq!(serialize("select 'x  \n  ' \n")?, "select 'x  \n  '\n");
        Ok(())
    }

    fn wrap_all(format: OutputFormat, sql: &str) -> String {
        let mut wrapper = OutputWrapper::new(format).unwrap();
        parsed(sql).iter().map(|s| wrapper.wrap(s)).collect()
    }

    #[test]
    fn python_assignments() {
        assert_eq!(wrap_all(OutputFormat::Python, "select * from foo;"), "sql = 'select * from foo;'");
        assert_eq!(
            wrap_all(OutputFormat::Python, "select * from foo; select 'x' from dual"),
            "sql = 'select * from foo; '\nsql2 = 'select \\'x\\' from dual'"
        );
        assert_eq!(
            wrap_all(OutputFormat::Python, "select *\nfrom foo;"),
            "sql = ('select * '\n       'from foo;')"
        );
    }

    #[test]
    fn php_assignments() {
        assert_eq!(wrap_all(OutputFormat::Php, "select * from foo;"), "$sql = \"select * from foo;\";");
        assert_eq!(
            wrap_all(OutputFormat::Php, "select *\nfrom \"foo\";"),
            "$sql  = \"select * \";\n$sql .= \"from \\\"foo\\\";\";"
        );
    }

    #[test]
    fn plain_sql_has_no_wrapper() {
        assert!(OutputWrapper::new(OutputFormat::Sql).is_none());
    }
}
