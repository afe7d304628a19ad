//! Token model shared between generated bindings and backends
//!
//! Backends encode and decode the wire format; bindings only ever see
//! [`Token`] values. Every Rust type the generator maps an ABI type to
//! implements [`Tokenizable`].

use alloy_primitives::{Address, Bytes, FixedBytes, I256, U256};

use crate::error::{BindError, Result};

/// A single ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    /// `bytesN` and `function` values
    FixedBytes(Vec<u8>),
    Bytes(Bytes),
    Int(I256),
    Uint(U256),
    Bool(bool),
    String(String),
    FixedArray(Vec<Token>),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    /// Short name of the token kind, used in decode errors
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::FixedBytes(_) => "fixed bytes",
            Token::Bytes(_) => "bytes",
            Token::Int(_) => "int",
            Token::Uint(_) => "uint",
            Token::Bool(_) => "bool",
            Token::String(_) => "string",
            Token::FixedArray(_) => "fixed array",
            Token::Array(_) => "array",
            Token::Tuple(_) => "tuple",
        }
    }
}

/// Conversion between a Rust value and its [`Token`]
pub trait Tokenizable: Sized {
    fn from_token(token: Token) -> Result<Self>;
    fn into_token(self) -> Token;
}

/// Decoding of a whole token sequence, e.g. an event record or a
/// multi-value call result
pub trait FromTokens: Sized {
    fn from_tokens(tokens: Vec<Token>) -> Result<Self>;
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl Tokenizable for $t {
            fn from_token(token: Token) -> Result<Self> {
                match token {
                    Token::Uint(value) => <$t>::try_from(value)
                        .map_err(|_| BindError::decode(stringify!($t), value.to_string())),
                    other => Err(BindError::decode(stringify!($t), other.kind())),
                }
            }

            fn into_token(self) -> Token {
                Token::Uint(U256::from(self))
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl Tokenizable for $t {
            fn from_token(token: Token) -> Result<Self> {
                match token {
                    Token::Int(value) => <$t>::try_from(value)
                        .map_err(|_| BindError::decode(stringify!($t), value.to_string())),
                    other => Err(BindError::decode(stringify!($t), other.kind())),
                }
            }

            fn into_token(self) -> Token {
                Token::Int(widen_signed(i128::from(self)))
            }
        }
    )*};
}

impl_unsigned!(u8, u16, u32, u64, u128);
impl_signed!(i8, i16, i32, i64, i128);

fn widen_signed(value: i128) -> I256 {
    let magnitude = I256::from_raw(U256::from(value.unsigned_abs()));
    if value < 0 { -magnitude } else { magnitude }
}

impl Tokenizable for U256 {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Uint(value) => Ok(value),
            other => Err(BindError::decode("U256", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::Uint(self)
    }
}

impl Tokenizable for I256 {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Int(value) => Ok(value),
            other => Err(BindError::decode("I256", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::Int(self)
    }
}

impl Tokenizable for bool {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Bool(value) => Ok(value),
            other => Err(BindError::decode("bool", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::Bool(self)
    }
}

impl Tokenizable for String {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::String(value) => Ok(value),
            other => Err(BindError::decode("String", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::String(self)
    }
}

impl Tokenizable for Address {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Address(value) => Ok(value),
            other => Err(BindError::decode("Address", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::Address(self)
    }
}

impl Tokenizable for Bytes {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Bytes(value) => Ok(value),
            other => Err(BindError::decode("Bytes", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::Bytes(self)
    }
}

impl<const N: usize> Tokenizable for FixedBytes<N> {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::FixedBytes(bytes) => <[u8; N]>::try_from(bytes.as_slice())
                .map(FixedBytes)
                .map_err(|_| BindError::decode("FixedBytes", format!("{} bytes", bytes.len()))),
            other => Err(BindError::decode("FixedBytes", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::FixedBytes(self.0.to_vec())
    }
}

impl<T: Tokenizable> Tokenizable for Vec<T> {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Array(items) => items.into_iter().map(T::from_token).collect(),
            other => Err(BindError::decode("Vec", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::Array(self.into_iter().map(T::into_token).collect())
    }
}

impl<T: Tokenizable, const N: usize> Tokenizable for [T; N] {
    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::FixedArray(items) => {
                let values = items
                    .into_iter()
                    .map(T::from_token)
                    .collect::<Result<Vec<T>>>()?;
                <[T; N]>::try_from(values).map_err(|values| BindError::Arity {
                    expected: N,
                    found: values.len(),
                })
            }
            other => Err(BindError::decode("array", other.kind())),
        }
    }

    fn into_token(self) -> Token {
        Token::FixedArray(self.into_iter().map(T::into_token).collect())
    }
}

/// Sequential reader over a token list with arity checking
#[derive(Debug)]
pub struct TokenReader {
    tokens: std::vec::IntoIter<Token>,
    total: usize,
    consumed: usize,
}

impl TokenReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            total: tokens.len(),
            tokens: tokens.into_iter(),
            consumed: 0,
        }
    }

    /// Reader over the components of a tuple token
    pub fn from_tuple(token: Token) -> Result<Self> {
        match token {
            Token::Tuple(components) => Ok(Self::new(components)),
            other => Err(BindError::decode("tuple", other.kind())),
        }
    }

    pub fn read<T: Tokenizable>(&mut self) -> Result<T> {
        let token = self.tokens.next().ok_or(BindError::Arity {
            expected: self.consumed + 1,
            found: self.total,
        })?;
        self.consumed += 1;
        T::from_token(token)
    }

    /// Fails if any token was left unread
    pub fn finish(self) -> Result<()> {
        if self.consumed == self.total {
            Ok(())
        } else {
            Err(BindError::Arity {
                expected: self.consumed,
                found: self.total,
            })
        }
    }

    /// Reads exactly one value
    pub fn single<T: Tokenizable>(mut self) -> Result<T> {
        let value = self.read()?;
        self.finish()?;
        Ok(value)
    }
}

impl FromTokens for () {
    fn from_tokens(tokens: Vec<Token>) -> Result<Self> {
        TokenReader::new(tokens).finish()
    }
}
