//! Tokenizer - turns expression text into a forest of syntax nodes.
//!
//! Parentheses become nesting: a group `( ... )` is a nameless node whose
//! children are the grouped tokens, and `NAME( ... )` is a function-call node
//! whose children are its arguments. Operator characters are emitted one at a
//! time and glued back together by [`merge_operators`].

use crate::expression::{ExpressionError, ExpressionResult};
use crate::syntax::{NodeId, NodeVariant, SyntaxTree};

/// Single characters emitted as operator nodes
const OPERATOR_CHARS: &[char] = &[
    '^', '%', '!', '~', '+', '-', '*', '/', '>', '<', '=', '&', '|',
];

/// Spellings recovered by merging two adjacent operator nodes
const COMPOUND_OPERATORS: &[&str] = &[">=", "<=", "==", "!=", "&&", "||", "<<", ">>"];

pub struct Tokenizer {
    tree: SyntaxTree,
    /// The node receiving new siblings
    scope: NodeId,
    buffer: String,
    in_quotes: bool,
}

impl Tokenizer {
    pub fn new() -> Self {
        let tree = SyntaxTree::new();
        let scope = tree.root();
        Self {
            tree,
            scope,
            buffer: String::new(),
            in_quotes: false,
        }
    }

    /// Build the syntax forest for `text`
    pub fn tokenize(mut self, text: &str) -> ExpressionResult<SyntaxTree> {
        for ch in text.chars() {
            if self.in_quotes {
                self.buffer.push(ch);
                if ch == '"' {
                    self.in_quotes = false;
                }
                continue;
            }

            match ch {
                '"' => {
                    self.buffer.push(ch);
                    self.in_quotes = true;
                }
                '(' => {
                    if self.buffer.trim().is_empty() {
                        self.buffer.clear();
                        self.down("", NodeVariant::Generic);
                    } else {
                        let name = std::mem::take(&mut self.buffer);
                        self.down(name.trim(), NodeVariant::FunctionCall);
                    }
                }
                ')' => {
                    self.commit();
                    self.up()?;
                }
                ',' => {
                    self.commit();
                    self.tree.push_child(self.scope, ",", NodeVariant::Separator);
                }
                c if OPERATOR_CHARS.contains(&c) => {
                    self.commit();
                    self.tree
                        .push_child(self.scope, c.to_string(), NodeVariant::Operator);
                }
                c if c.is_whitespace() => self.commit(),
                c => self.buffer.push(c),
            }
        }

        self.commit();
        if self.scope != self.tree.root() {
            return Err(ExpressionError::ParenthesisMismatch {
                reason: format!("unclosed parenthesis in '{}'", text),
            });
        }

        let root = self.tree.root();
        self.tree.remove_empty_children(root);
        log::debug!("tokenized '{}' into {}", text, self.tree);
        Ok(self.tree)
    }

    /// Flush the pending text as a generic sibling
    fn commit(&mut self) {
        let text = self.buffer.trim();
        if !text.is_empty() {
            let text = text.to_string();
            self.tree.push_child(self.scope, text, NodeVariant::Generic);
        }
        self.buffer.clear();
    }

    /// Open a nesting level under a new node
    fn down(&mut self, name: &str, variant: NodeVariant) {
        self.scope = self.tree.push_child(self.scope, name, variant);
    }

    fn up(&mut self) -> ExpressionResult<()> {
        match self.tree.node(self.scope).parent() {
            Some(parent) => {
                self.scope = parent;
                Ok(())
            }
            None => Err(ExpressionError::ParenthesisMismatch {
                reason: "closing parenthesis without a matching opening one".to_string(),
            }),
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Glue adjacent single-character operators into their compound spelling
/// (`>` `=` becomes `>=`), recursively over the whole tree
pub fn merge_operators(tree: &mut SyntaxTree) {
    let root = tree.root();
    merge_siblings(tree, root);
    log::debug!("merged operators: {}", tree);
}

fn merge_siblings(tree: &mut SyntaxTree, parent: NodeId) {
    let mut index = 0;
    while index + 1 < tree.children(parent).len() {
        let current = tree.children(parent)[index];
        let next = tree.children(parent)[index + 1];
        let both_operators = tree.node(current).variant() == NodeVariant::Operator
            && tree.node(next).variant() == NodeVariant::Operator;

        if both_operators {
            let merged = format!("{}{}", tree.node(current).name(), tree.node(next).name());
            if COMPOUND_OPERATORS.contains(&merged.as_str()) {
                let suffix = tree.node(next).name().to_string();
                tree.append_name(current, &suffix);
                tree.remove_child(parent, index + 1);
                continue;
            }
        }
        index += 1;
    }

    let children = tree.children(parent).to_vec();
    for child in children {
        merge_siblings(tree, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> SyntaxTree {
        let mut tree = Tokenizer::new().tokenize(text).unwrap();
        merge_operators(&mut tree);
        tree
    }

    fn names(tree: &SyntaxTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|id| tree.node(*id).name().to_string()).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tree = tokenize("x + 5 > 9");
        assert_eq!(names(&tree, tree.forest()), vec!["x", "+", "5", ">", "9"]);
        assert_eq!(tree.node(tree.forest()[1]).variant(), NodeVariant::Operator);
        assert_eq!(tree.node(tree.forest()[0]).variant(), NodeVariant::Generic);
    }

    #[test]
    fn test_no_spaces_required() {
        let tree = tokenize("x+4<=2");
        assert_eq!(names(&tree, tree.forest()), vec!["x", "+", "4", "<=", "2"]);
    }

    #[test]
    fn test_compound_operators() {
        let tree = tokenize("a>=b<=c==d!=e&&f||g<<h>>i");
        assert_eq!(
            names(&tree, tree.forest()),
            vec!["a", ">=", "b", "<=", "c", "==", "d", "!=", "e", "&&", "f", "||", "g", "<<", "h", ">>", "i"]
        );
    }

    #[test]
    fn test_unknown_compound_is_not_merged() {
        let tree = tokenize("2*-x");
        assert_eq!(names(&tree, tree.forest()), vec!["2", "*", "-", "x"]);

        let tree = tokenize("x >= -1");
        assert_eq!(names(&tree, tree.forest()), vec!["x", ">=", "-", "1"]);
    }

    #[test]
    fn test_grouping() {
        let tree = tokenize("2+(x + 5)* 3");
        let forest = tree.forest();
        assert_eq!(names(&tree, forest), vec!["2", "+", "", "*", "3"]);
        let group = tree.children(forest[2]);
        assert_eq!(names(&tree, group), vec!["x", "+", "5"]);
        assert_eq!(tree.to_string(), "2+(x+5)*3");
    }

    #[test]
    fn test_function_call() {
        let tree = tokenize("x + SUM(x- 1, 3, 2)");
        let forest = tree.forest();
        assert_eq!(names(&tree, forest), vec!["x", "+", "SUM"]);
        let call = tree.node(forest[2]);
        assert_eq!(call.variant(), NodeVariant::FunctionCall);
        assert_eq!(
            names(&tree, call.children()),
            vec!["x", "-", "1", ",", "3", ",", "2"]
        );
        assert_eq!(
            tree.node(call.children()[3]).variant(),
            NodeVariant::Separator
        );
    }

    #[test]
    fn test_separator_never_merges() {
        let tree = tokenize("POW(2,-3)");
        let call = tree.forest()[0];
        assert_eq!(names(&tree, tree.children(call)), vec!["2", ",", "-", "3"]);
    }

    #[test]
    fn test_empty_groups_removed() {
        let tree = tokenize("(x) + ()");
        assert_eq!(names(&tree, tree.forest()), vec!["", "+"]);
    }

    #[test]
    fn test_quoted_literal_kept_whole() {
        let tree = tokenize("x == \"hello, big (world)\"");
        assert_eq!(
            names(&tree, tree.forest()),
            vec!["x", "==", "\"hello, big (world)\""]
        );
    }

    #[test]
    fn test_nested_merge() {
        let tree = tokenize("(a > = b)");
        let group = tree.forest()[0];
        assert_eq!(names(&tree, tree.children(group)), vec!["a", ">=", "b"]);
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert!(matches!(
            Tokenizer::new().tokenize("(x+1"),
            Err(ExpressionError::ParenthesisMismatch { .. })
        ));
        assert!(matches!(
            Tokenizer::new().tokenize("x+1)"),
            Err(ExpressionError::ParenthesisMismatch { .. })
        ));
        assert!(matches!(
            Tokenizer::new().tokenize("SUM(1,2"),
            Err(ExpressionError::ParenthesisMismatch { .. })
        ));
    }
}
