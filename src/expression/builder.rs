//! Expression builder - turns a categorized syntax forest into a typed
//! expression tree.
//!
//! Each sibling list is split at its loosest binder: earlier siblings become
//! the left operand group, later siblings the right one, and both are built
//! recursively. Parenthesized groups are unwrapped when they are the only
//! thing left in a list.

use crate::expression::functions::FunctionMetadata;
use crate::expression::literal::{is_identifier, parse_literal};
use crate::expression::operation::{self, OperationShape};
use crate::expression::promotion::promote_pair;
use crate::expression::{Expression, ExpressionError, ExpressionResult, ParameterRef};
use crate::parser::Parameter;
use crate::syntax::{Category, NodeId, SyntaxNode, SyntaxTree};
use crate::value::DataType;

pub struct ExpressionBuilder<'a> {
    /// Parameters declared by the caller
    declared: &'a [Parameter],
    output_type: Option<DataType>,
    /// Parameters referenced so far, in first-seen order
    parameters: Vec<ParameterRef>,
}

impl<'a> ExpressionBuilder<'a> {
    pub fn new(declared: &'a [Parameter], output_type: Option<DataType>) -> Self {
        Self {
            declared,
            output_type,
            parameters: Vec::new(),
        }
    }

    /// Build the expression for the whole forest of `tree`
    pub fn build(&mut self, tree: &SyntaxTree) -> ExpressionResult<Expression> {
        self.parameters.clear();
        let forest = tree.forest();
        if forest.is_empty() {
            return Err(ExpressionError::EmptyExpression {
                context: "input".to_string(),
            });
        }

        self.build_group(tree, forest)
    }

    /// The parameters the built expression references, in first-seen order
    pub fn parameters(&self) -> &[ParameterRef] {
        &self.parameters
    }

    pub fn into_parameters(self) -> Vec<ParameterRef> {
        self.parameters
    }

    fn build_group<'t>(
        &mut self,
        tree: &'t SyntaxTree,
        nodes: &'t [NodeId],
    ) -> ExpressionResult<Expression> {
        let mut nodes = nodes;
        loop {
            let index = split_point(tree, nodes).ok_or_else(|| ExpressionError::EmptyExpression {
                context: "group".to_string(),
            })?;
            let node = tree.node(nodes[index]);

            if node.category() == Category::SubExpression {
                if nodes.len() > 1 {
                    let neighbour = if index > 0 { index - 1 } else { index + 1 };
                    return Err(ExpressionError::UnexpectedOperand {
                        token: tree.render(&nodes[neighbour..=neighbour]),
                    });
                }
                nodes = node.children();
                continue;
            }

            log::trace!(
                "split '{}' at '{}' ({:?})",
                tree.render(nodes),
                node.name(),
                node.category()
            );
            let built = self.build_node(tree, node, &nodes[..index], &nodes[index + 1..])?;
            return self.force_output_type(built);
        }
    }

    /// Every group, operands and call arguments included, is converted to the
    /// forced result type before its parent uses it
    fn force_output_type(&self, expression: Expression) -> ExpressionResult<Expression> {
        match self.output_type {
            Some(target) => Expression::convert(expression, target),
            None => Ok(expression),
        }
    }

    fn build_node(
        &mut self,
        tree: &SyntaxTree,
        node: &SyntaxNode,
        left: &[NodeId],
        right: &[NodeId],
    ) -> ExpressionResult<Expression> {
        match node.category() {
            Category::Literal => {
                expect_alone(tree, left, right)?;
                return build_literal(node.name());
            }
            Category::Parameter => {
                expect_alone(tree, left, right)?;
                return self.build_parameter(node.name());
            }
            Category::Function => expect_alone(tree, left, right)?,
            Category::Unknown | Category::Empty | Category::SubExpression | Category::Separator => {
                return Err(ExpressionError::UnexpectedOperand {
                    token: node.name().to_string(),
                });
            }
            _ => {}
        }

        match operation::resolve(node.name(), node.category())? {
            OperationShape::Unary(op) => {
                if !left.is_empty() || right.is_empty() {
                    return Err(ExpressionError::MalformedUnary {
                        operator: node.name().to_string(),
                    });
                }
                let operand = self.build_group(tree, right)?;
                Expression::unary_op(op, operand)
            }

            OperationShape::Binary(op) => {
                let (left, right) = self.build_operands(tree, node, left, right)?;
                let (left, right) = promote_pair(left, right)?;
                Expression::binary_op(op, left, right)
            }

            OperationShape::NamedBinaryCall(function) => {
                let (left, right) = self.build_operands(tree, node, left, right)?;
                let arguments = coerce_arguments(function, vec![left, right])?;
                Ok(Expression::call(function, arguments, false))
            }

            OperationShape::UnaryCall(function) => {
                let arguments = self.build_call_arguments(tree, node)?;
                if arguments.len() != 1 {
                    return Err(ExpressionError::CallArityMismatch {
                        function: function.name.to_string(),
                        expected: 1,
                        actual: arguments.len(),
                    });
                }
                let arguments = coerce_arguments(function, arguments)?;
                Ok(Expression::call(function, arguments, false))
            }

            OperationShape::MultiArgCall(function) => {
                let arguments = self.build_call_arguments(tree, node)?;
                if arguments.len() != function.parameter_types.len() {
                    return Err(ExpressionError::CallArityMismatch {
                        function: function.name.to_string(),
                        expected: function.parameter_types.len(),
                        actual: arguments.len(),
                    });
                }
                let arguments = coerce_arguments(function, arguments)?;
                Ok(Expression::call(function, arguments, false))
            }

            OperationShape::VariadicCall(function) => {
                let arguments = self.build_call_arguments(tree, node)?;
                let arguments = coerce_arguments(function, arguments)?;
                Ok(Expression::call(function, arguments, true))
            }
        }
    }

    /// Build both sides of an infix operator
    fn build_operands(
        &mut self,
        tree: &SyntaxTree,
        node: &SyntaxNode,
        left: &[NodeId],
        right: &[NodeId],
    ) -> ExpressionResult<(Expression, Expression)> {
        if left.is_empty() || right.is_empty() {
            return Err(ExpressionError::MalformedBinary {
                operator: node.name().to_string(),
            });
        }
        let left = self.build_group(tree, left)?;
        let right = self.build_group(tree, right)?;
        Ok((left, right))
    }

    /// Split the children of a call at its separators and build one
    /// expression per argument. A trailing empty argument is ignored.
    fn build_call_arguments(
        &mut self,
        tree: &SyntaxTree,
        call: &SyntaxNode,
    ) -> ExpressionResult<Vec<Expression>> {
        let children = call.children();
        let mut groups: Vec<&[NodeId]> = Vec::new();
        let mut start = 0;
        for (i, &child) in children.iter().enumerate() {
            if tree.node(child).category() == Category::Separator {
                groups.push(&children[start..i]);
                start = i + 1;
            }
        }
        if start < children.len() {
            groups.push(&children[start..]);
        }

        let mut arguments = Vec::with_capacity(groups.len());
        for (i, group) in groups.into_iter().enumerate() {
            if group.is_empty() {
                return Err(ExpressionError::EmptyExpression {
                    context: format!("argument {} of {}", i + 1, call.name()),
                });
            }
            arguments.push(self.build_group(tree, group)?);
        }
        Ok(arguments)
    }

    /// Resolve a parameter name, creating its reference on first use
    fn build_parameter(&mut self, name: &str) -> ExpressionResult<Expression> {
        if let Some(existing) = self.parameters.iter().find(|p| p.name == name) {
            return Ok(Expression::parameter(existing.clone()));
        }

        let declared = self
            .declared
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ExpressionError::UndeclaredParameter {
                name: name.to_string(),
            })?;

        let parameter = ParameterRef {
            name: declared.name.clone(),
            data_type: declared.data_type,
            position: self.parameters.len(),
        };
        self.parameters.push(parameter.clone());
        Ok(Expression::parameter(parameter))
    }
}

/// Index of the loosest binder in a sibling list. Left-associative operators
/// split at their last occurrence, everything else at the first.
///
/// A prefix operator only splits its list when it leads it. Anywhere else it
/// belongs to the right operand of a tighter operator, as in `x ^ -1`.
fn split_point(tree: &SyntaxTree, nodes: &[NodeId]) -> Option<usize> {
    let category = |i: usize| tree.node(nodes[i]).category();
    let eligible: Vec<usize> = (0..nodes.len())
        .filter(|&i| i == 0 || category(i) != Category::OpUnary)
        .collect();

    let loosest = eligible.iter().map(|&i| category(i)).max()?;
    let mut matching = eligible.into_iter().filter(|&i| category(i) == loosest);
    if loosest.is_left_associative() {
        matching.last()
    } else {
        matching.next()
    }
}

fn expect_alone(tree: &SyntaxTree, left: &[NodeId], right: &[NodeId]) -> ExpressionResult<()> {
    match left.last().or(right.first()) {
        Some(&neighbour) => Err(ExpressionError::UnexpectedOperand {
            token: tree.render(&[neighbour]),
        }),
        None => Ok(()),
    }
}

fn build_literal(text: &str) -> ExpressionResult<Expression> {
    match parse_literal(text) {
        Ok(value) => Ok(Expression::literal(value)),
        // a bare name that is neither declared nor a literal
        Err(_) if is_identifier(text) => Err(ExpressionError::UndeclaredParameter {
            name: text.to_string(),
        }),
        Err(e) => Err(e),
    }
}

/// Convert each argument to the declared parameter type of `function`
fn coerce_arguments(
    function: &FunctionMetadata,
    arguments: Vec<Expression>,
) -> ExpressionResult<Vec<Expression>> {
    let count = arguments.len();
    arguments
        .into_iter()
        .enumerate()
        .map(|(i, argument)| {
            let target =
                function
                    .parameter_type(i)
                    .ok_or_else(|| ExpressionError::CallArityMismatch {
                        function: function.name.to_string(),
                        expected: function.parameter_types.len(),
                        actual: count,
                    })?;
            Expression::convert(argument, target)
        })
        .collect()
}
