//! Precedence categories of syntax nodes.

/// The role of a syntax node.
///
/// The declaration order is the precedence: operator categories go from the
/// tightest binder to the loosest one, and the expression builder splits a
/// sibling list at its loosest (numerically highest) member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Category {
    #[default]
    Unknown,
    Empty,
    SubExpression,
    Literal,
    Parameter,
    /// A call such as `SUM(`, `AVG(`
    Function,
    /// The `,` between call arguments
    Separator,

    /// `x.y f(x) a[x]`
    OpPrimary,
    /// `^`
    OpCall,
    /// `+ - ! ~` in prefix position
    OpUnary,
    /// `* / %`
    OpMultiplicative,
    /// `+ -`
    OpAdditive,
    /// `<< >>`
    OpShift,
    /// `< > <= >=`
    OpRelational,
    /// `== !=`
    OpEquality,
    /// `&`
    OpBitwiseAnd,
    /// `|`
    OpBitwiseOr,
    /// `&&`
    OpLogicalAnd,
    /// `||`
    OpLogicalOr,
    /// `?:`
    OpConditional,
    /// `=`
    OpAssignment,
}

impl Category {
    pub fn is_operator(&self) -> bool {
        *self >= Category::OpPrimary
    }

    /// Binary operator categories associate to the left, so the builder splits
    /// at their last occurrence. Prefix operators and `^` split at the first.
    pub fn is_left_associative(&self) -> bool {
        *self >= Category::OpMultiplicative && *self <= Category::OpAssignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(Category::OpUnary < Category::OpMultiplicative);
        assert!(Category::OpMultiplicative < Category::OpAdditive);
        assert!(Category::OpRelational < Category::OpEquality);
        assert!(Category::OpLogicalAnd < Category::OpLogicalOr);
        assert!(Category::OpCall < Category::OpUnary);
        assert!(Category::Literal < Category::OpPrimary);
        assert!(Category::SubExpression < Category::Literal);
    }

    #[test]
    fn test_associativity() {
        assert!(Category::OpAdditive.is_left_associative());
        assert!(Category::OpLogicalOr.is_left_associative());
        assert!(!Category::OpUnary.is_left_associative());
        assert!(!Category::OpCall.is_left_associative());
        assert!(!Category::Literal.is_left_associative());
    }

    #[test]
    fn test_is_operator() {
        assert!(Category::OpShift.is_operator());
        assert!(!Category::Separator.is_operator());
        assert_eq!(Category::default(), Category::Unknown);
    }
}
