//! Tensor, sequence, named-tuple, and function types.

use std::fmt;

// ──────────────────────────────────────────────
// DType
// ──────────────────────────────────────────────

/// Element type of a tensor leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
}

impl DType {
    /// The wire-format enum name (`DT_INT32` style).
    pub fn wire_name(&self) -> &'static str {
        match self {
            DType::Bool => "DT_BOOL",
            DType::Int32 => "DT_INT32",
            DType::Int64 => "DT_INT64",
            DType::UInt32 => "DT_UINT32",
            DType::UInt64 => "DT_UINT64",
            DType::Float32 => "DT_FLOAT",
            DType::Float64 => "DT_DOUBLE",
            DType::String => "DT_STRING",
        }
    }

    /// Parse a wire-format enum name. Returns `None` for names this
    /// model does not cover.
    pub fn from_wire_name(name: &str) -> Option<DType> {
        match name {
            "DT_BOOL" => Some(DType::Bool),
            "DT_INT32" => Some(DType::Int32),
            "DT_INT64" => Some(DType::Int64),
            "DT_UINT32" => Some(DType::UInt32),
            "DT_UINT64" => Some(DType::UInt64),
            "DT_FLOAT" => Some(DType::Float32),
            "DT_DOUBLE" => Some(DType::Float64),
            "DT_STRING" => Some(DType::String),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::String => "string",
        };
        write!(f, "{}", name)
    }
}

// ──────────────────────────────────────────────
// Shape
// ──────────────────────────────────────────────

/// A single tensor dimension: a known size or unknown extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    Size(u64),
    Unknown,
}

/// Tensor shape: an ordered list of dimensions. The scalar shape is
/// the empty list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    pub dims: Vec<Dim>,
}

impl Shape {
    /// The scalar (rank-zero) shape.
    pub fn scalar() -> Shape {
        Shape { dims: Vec::new() }
    }

    /// A shape with the given known sizes.
    pub fn of(sizes: &[u64]) -> Shape {
        Shape {
            dims: sizes.iter().map(|s| Dim::Size(*s)).collect(),
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Whether a value of shape `other` fits this shape. Ranks must
    /// agree; an unknown dimension accepts any size, a known size
    /// accepts only itself.
    pub fn is_assignable_from(&self, other: &Shape) -> bool {
        self.dims.len() == other.dims.len()
            && self
                .dims
                .iter()
                .zip(other.dims.iter())
                .all(|(mine, theirs)| match (mine, theirs) {
                    (Dim::Unknown, _) => true,
                    (Dim::Size(a), Dim::Size(b)) => a == b,
                    (Dim::Size(_), Dim::Unknown) => false,
                })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dims.is_empty() {
            return Ok(());
        }
        write!(f, "[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match dim {
                Dim::Size(n) => write!(f, "{}", n)?,
                Dim::Unknown => write!(f, "?")?,
            }
        }
        write!(f, "]")
    }
}

// ──────────────────────────────────────────────
// Type
// ──────────────────────────────────────────────

/// One element of a named-tuple type. Order is significant and name
/// presence is preserved exactly; names need not be unique across
/// elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub name: Option<String>,
    pub value: Type,
}

impl TupleElement {
    pub fn named(name: &str, value: Type) -> TupleElement {
        TupleElement {
            name: Some(name.to_string()),
            value,
        }
    }

    pub fn unnamed(value: Type) -> TupleElement {
        TupleElement { name: None, value }
    }
}

/// A type signature: tensor leaf, sequence, named tuple, or function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Tensor { dtype: DType, shape: Shape },
    Sequence(Box<Type>),
    Tuple(Vec<TupleElement>),
    Function {
        parameter: Option<Box<Type>>,
        result: Box<Type>,
    },
}

impl Type {
    /// A scalar tensor of the given dtype.
    pub fn tensor(dtype: DType) -> Type {
        Type::Tensor {
            dtype,
            shape: Shape::scalar(),
        }
    }

    pub fn tensor_shaped(dtype: DType, shape: Shape) -> Type {
        Type::Tensor { dtype, shape }
    }

    pub fn sequence(element: Type) -> Type {
        Type::Sequence(Box::new(element))
    }

    pub fn tuple(elements: Vec<TupleElement>) -> Type {
        Type::Tuple(elements)
    }

    /// The empty tuple type `<>`.
    pub fn unit() -> Type {
        Type::Tuple(Vec::new())
    }

    pub fn function(parameter: Option<Type>, result: Type) -> Type {
        Type::Function {
            parameter: parameter.map(Box::new),
            result: Box::new(result),
        }
    }

    /// The type of a unary operator over `t`, i.e. `(t -> t)`.
    pub fn unary_op(t: Type) -> Type {
        Type::function(Some(t.clone()), t)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Type::Tuple(_))
    }

    /// Whether a value of type `other` can be used where this type is
    /// expected.
    ///
    /// Tensors require the same dtype and an assignable shape (unknown
    /// dimensions widen). Tuples match element-wise: an expected name
    /// must be matched exactly, an unnamed expected element accepts
    /// any name. Functions are contravariant in the parameter and
    /// covariant in the result. Different variants never match.
    pub fn is_assignable_from(&self, other: &Type) -> bool {
        match (self, other) {
            (
                Type::Tensor { dtype, shape },
                Type::Tensor {
                    dtype: other_dtype,
                    shape: other_shape,
                },
            ) => dtype == other_dtype && shape.is_assignable_from(other_shape),
            (Type::Sequence(element), Type::Sequence(other_element)) => {
                element.is_assignable_from(other_element)
            }
            (Type::Tuple(elements), Type::Tuple(other_elements)) => {
                elements.len() == other_elements.len()
                    && elements.iter().zip(other_elements.iter()).all(|(a, b)| {
                        let names_agree = match &a.name {
                            None => true,
                            Some(name) => b.name.as_deref() == Some(name.as_str()),
                        };
                        names_agree && a.value.is_assignable_from(&b.value)
                    })
            }
            (
                Type::Function { parameter, result },
                Type::Function {
                    parameter: other_parameter,
                    result: other_result,
                },
            ) => {
                let parameter_ok = match (parameter, other_parameter) {
                    (None, None) => true,
                    // Contravariant: the other function must accept at
                    // least what this one declares.
                    (Some(mine), Some(theirs)) => theirs.is_assignable_from(mine),
                    _ => false,
                };
                parameter_ok && result.is_assignable_from(other_result)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Tensor { dtype, shape } => write!(f, "{}{}", dtype, shape),
            Type::Sequence(element) => write!(f, "{}*", element),
            Type::Tuple(elements) => {
                write!(f, "<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if let Some(name) = &element.name {
                        write!(f, "{}=", name)?;
                    }
                    write!(f, "{}", element.value)?;
                }
                write!(f, ">")
            }
            Type::Function { parameter, result } => match parameter {
                Some(parameter) => write!(f, "({} -> {})", parameter, result),
                None => write!(f, "( -> {})", result),
            },
        }
    }
}
