//! Query operator tree.
//!
//! List operators (`Term`, `Syn`, `Near`, `Window`) produce inverted lists; every other operator
//! produces scores. A score operator that receives a list child scores it through an implicit
//! [`QueryNode::Score`].

use std::{fmt, slice};

use sift_index::DEFAULT_FIELD;

/// A node of a parsed query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// An analyzed term in one field.
    Term {
        /// Normalized term text.
        text: String,
        /// Field to search.
        field: String,
    },

    /// Union of its children's postings.
    Syn(Vec<Self>),

    /// Ordered proximity: each child follows the previous one within `distance` positions.
    Near {
        /// Maximum gap between consecutive children.
        distance: u32,
        /// List operator children, in order.
        children: Vec<Self>,
    },

    /// Unordered proximity: one position per child, all inside a span of `width` positions.
    Window {
        /// Maximum span, counting both ends.
        width: u32,
        /// List operator children.
        children: Vec<Self>,
    },

    /// Converts a list child to scores.
    Score(Box<Self>),

    /// Conjunction.
    And(Vec<Self>),

    /// Disjunction.
    Or(Vec<Self>),

    /// Sum of scores.
    Sum(Vec<Self>),

    /// Weighted conjunction.
    WeightedAnd {
        /// Arguments.
        children: Vec<Self>,
        /// One weight per argument.
        weights: Vec<f64>,
    },

    /// Weighted sum.
    WeightedSum {
        /// Arguments.
        children: Vec<Self>,
        /// One weight per argument.
        weights: Vec<f64>,
    },
}

impl QueryNode {
    /// Creates a term in the default field.
    pub fn term(text: impl Into<String>) -> Self {
        Self::term_in(text, DEFAULT_FIELD)
    }

    /// Creates a term in `field`.
    pub fn term_in(text: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Term {
            text: text.into(),
            field: field.into(),
        }
    }

    /// Returns true if the node evaluates to an inverted list.
    pub fn is_list_operator(&self) -> bool {
        matches!(
            self,
            Self::Term { .. } | Self::Syn(_) | Self::Near { .. } | Self::Window { .. }
        )
    }

    /// Field of a list operator: the term's own field, or its first child's.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Term { field, .. } => Some(field),
            Self::Syn(children)
            | Self::Near { children, .. }
            | Self::Window { children, .. } => children.first().and_then(Self::field),
            _ => None,
        }
    }

    /// Direct children of the node.
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Term { .. } => &[],
            Self::Score(child) => slice::from_ref(child.as_ref()),
            Self::Syn(children)
            | Self::And(children)
            | Self::Or(children)
            | Self::Sum(children)
            | Self::Near { children, .. }
            | Self::Window { children, .. }
            | Self::WeightedAnd { children, .. }
            | Self::WeightedSum { children, .. } => children,
        }
    }

    /// Operator keyword as written in a query.
    pub fn name(&self) -> String {
        match self {
            Self::Term { .. } => "term".to_string(),
            Self::Syn(_) => "#syn".to_string(),
            Self::Near { distance, .. } => format!("#near/{distance}"),
            Self::Window { width, .. } => format!("#window/{width}"),
            Self::Score(_) => "#score".to_string(),
            Self::And(_) => "#and".to_string(),
            Self::Or(_) => "#or".to_string(),
            Self::Sum(_) => "#sum".to_string(),
            Self::WeightedAnd { .. } => "#wand".to_string(),
            Self::WeightedSum { .. } => "#wsum".to_string(),
        }
    }

    /// Formats the node as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term { text, field } => writeln!(f, "{prefix}Term({text:?}, {field})"),
            Self::WeightedAnd { children, weights } | Self::WeightedSum { children, weights } => {
                writeln!(f, "{prefix}{}", self.name())?;
                for (child, weight) in children.iter().zip(weights) {
                    writeln!(f, "{prefix}  weight {weight}")?;
                    child.fmt_tree(f, indent + 2)?;
                }
                Ok(())
            }
            _ => {
                writeln!(f, "{prefix}{}", self.name())?;
                for child in self.children() {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }

    /// Formats the node in query syntax, e.g. `#and(crab ocean.title)`.
    ///
    /// Terms in the default field carry no suffix. The implicit score operator is transparent.
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Term { text, field } if field == DEFAULT_FIELD => text.clone(),
            Self::Term { text, field } => format!("{text}.{field}"),
            Self::Score(child) => child.to_query_string(),
            Self::WeightedAnd { children, weights } | Self::WeightedSum { children, weights } => {
                let parts: Vec<String> = children
                    .iter()
                    .zip(weights)
                    .map(|(child, weight)| format!("{weight} {}", child.to_query_string()))
                    .collect();
                format!("{}({})", self.name(), parts.join(" "))
            }
            _ => {
                let parts: Vec<String> =
                    self.children().iter().map(Self::to_query_string).collect();
                format!("{}({})", self.name(), parts.join(" "))
            }
        }
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
