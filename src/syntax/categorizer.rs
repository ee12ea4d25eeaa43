//! Assigns a precedence category to every syntax node.

use crate::expression::ExpressionResult;
use crate::syntax::{Category, NodeId, NodeVariant, SyntaxTree};

/// Categorize the whole forest against the declared parameter names
pub fn categorize(tree: &mut SyntaxTree, parameter_names: &[&str]) -> ExpressionResult<()> {
    let root = tree.root();
    categorize_siblings(tree, root, parameter_names)
}

fn categorize_siblings(
    tree: &mut SyntaxTree,
    parent: NodeId,
    parameter_names: &[&str],
) -> ExpressionResult<()> {
    let siblings = tree.children(parent).to_vec();
    let mut previous: Option<NodeVariant> = None;

    for id in siblings {
        let category = classify(tree, id, previous, parameter_names);
        tree.set_category(id, category)?;
        previous = Some(tree.node(id).variant());
        categorize_siblings(tree, id, parameter_names)?;
    }
    Ok(())
}

fn classify(
    tree: &SyntaxTree,
    id: NodeId,
    previous: Option<NodeVariant>,
    parameter_names: &[&str],
) -> Category {
    let node = tree.node(id);
    match node.name() {
        "+" | "-" if node.variant() == NodeVariant::Operator => {
            // prefix position: first in its group, or right after another operator
            let prefix = matches!(
                previous,
                None | Some(NodeVariant::Operator) | Some(NodeVariant::Separator)
            );
            if prefix {
                Category::OpUnary
            } else {
                Category::OpAdditive
            }
        }
        "!" | "~" => Category::OpUnary,
        "*" | "/" | "%" => Category::OpMultiplicative,
        "<<" | ">>" => Category::OpShift,
        "<" | ">" | "<=" | ">=" => Category::OpRelational,
        "==" | "!=" => Category::OpEquality,
        "&" => Category::OpBitwiseAnd,
        "|" => Category::OpBitwiseOr,
        "&&" => Category::OpLogicalAnd,
        "||" => Category::OpLogicalOr,
        "=" => Category::OpAssignment,
        "" => Category::SubExpression,
        "," => Category::Separator,
        "^" => Category::OpCall,
        name => {
            if node.variant() == NodeVariant::FunctionCall {
                Category::Function
            } else if parameter_names.contains(&name) {
                Category::Parameter
            } else {
                Category::Literal
            }
        }
    }
}
