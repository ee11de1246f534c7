//! Right margin: break lines that would run past a column.
use crate::*;

/// Breaks before any token that would end past `width`, continuing at the
/// current line's indentation.
///
/// Identifiers, functions and typed literals are kept whole. A single token
/// longer than the margin stays on its own line. The line being built carries
/// over between statements.
#[derive(Debug)]
pub struct RightMargin {
    width: usize,
    line: String,
}

impl RightMargin {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            line: String::new(),
        }
    }

    fn keeps_together(tree: &Tree, id: NodeId) -> bool {
        tree.is_any_kind(id, &[GroupKind::Identifier, GroupKind::Function, GroupKind::TypedLiteral])
            && !tree.value(id).contains(['\n', '\r'])
    }

    fn process_list(&mut self, tree: &mut Tree, list: NodeId) {
        let mut idx = 0;
        while let Some(id) = tree.child(list, idx) {
            let value = tree.value(id);
            if tree.is_whitespace(id) && value.contains(['\n', '\r']) {
                let tail = value.rfind(['\n', '\r']).map_or("", |at| &value[at + 1..]);
                self.line = tail.to_string();
            } else if tree.is_group(id) && !Self::keeps_together(tree, id) {
                self.process_list(tree, id);
            } else {
                let overflows = self.line.chars().count() + value.chars().count() > self.width;
                if overflows && !tree.is_whitespace(id) && !self.line.trim().is_empty() {
                    let indent: String = self.line.chars().take_while(|c| c.is_whitespace()).collect();
                    let prev = idx.checked_sub(1).and_then(|p| tree.child(list, p));
                    match prev.filter(|&p| tree.is_whitespace(p)) {
                        Some(space) => tree.set_value(space, format!("\n{indent}")),
                        None => {
                            tree.insert_before(list, idx, Token::new(Category::Whitespace, format!("\n{indent}")));
                            idx += 1;
                        }
                    }
                    self.line = indent;
                }
                self.line.push_str(&value);
            }
            idx += 1;
        }
    }
}

impl StatementFilter for RightMargin {
    fn process(&mut self, statement: &mut Statement) {
        let root = statement.root();
        self.process_list(statement.tree_mut(), root);
    }
}
