/// A parsed command line.
///
/// Every child is exclusively owned by its parent, so dropping the root
/// releases the whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionNode {
    Empty,
    /// Program name followed by its arguments.
    Simple(Vec<String>),
    /// `left ; right`
    Sequence(Box<ExpressionNode>, Box<ExpressionNode>),
    /// `left && right`
    SequenceAnd(Box<ExpressionNode>, Box<ExpressionNode>),
    /// `left || right`
    SequenceOr(Box<ExpressionNode>, Box<ExpressionNode>),
    /// `node &`
    Background(Box<ExpressionNode>),
    /// `left | right`
    Pipe(Box<ExpressionNode>, Box<ExpressionNode>),
    Redirect {
        kind: RedirectKind,
        file: String,
        node: Box<ExpressionNode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectKind {
    /// `< file`
    In,
    /// `> file`
    Out,
    /// `>> file`
    Append,
    /// `2> file`
    Err,
    /// `&> file`
    ErrOut,
}

impl ExpressionNode {
    pub fn simple<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExpressionNode::Simple(args.into_iter().map(Into::into).collect())
    }

    pub fn sequence(left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::Sequence(Box::new(left), Box::new(right))
    }

    pub fn and(left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::SequenceAnd(Box::new(left), Box::new(right))
    }

    pub fn or(left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::SequenceOr(Box::new(left), Box::new(right))
    }

    pub fn background(node: ExpressionNode) -> Self {
        ExpressionNode::Background(Box::new(node))
    }

    pub fn pipe(left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::Pipe(Box::new(left), Box::new(right))
    }

    pub fn redirect(kind: RedirectKind, file: impl Into<String>, node: ExpressionNode) -> Self {
        ExpressionNode::Redirect {
            kind,
            file: file.into(),
            node: Box::new(node),
        }
    }

    /// Label of the node kind, as shown in tree dumps and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExpressionNode::Empty => "EMPTY",
            ExpressionNode::Simple(_) => "SIMPLE",
            ExpressionNode::Sequence(..) => "SEQUENCE",
            ExpressionNode::SequenceAnd(..) => "SEQUENCE_AND",
            ExpressionNode::SequenceOr(..) => "SEQUENCE_OR",
            ExpressionNode::Background(_) => "BACKGROUND",
            ExpressionNode::Pipe(..) => "PIPE",
            ExpressionNode::Redirect { kind, .. } => match kind {
                RedirectKind::In => "REDIRECTION_I",
                RedirectKind::Out => "REDIRECTION_O",
                RedirectKind::Append => "REDIRECTION_A",
                RedirectKind::Err => "REDIRECTION_E",
                RedirectKind::ErrOut => "REDIRECTION_EO",
            },
        }
    }
}
