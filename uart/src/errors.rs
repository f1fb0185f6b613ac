use core::fmt;

use super::{SerialRead, SerialReadWrite, SerialWrite};

/// A transfer that did not complete.
pub(crate) enum Stalled<E> {
    Failed(E),
    TimedOut,
}

pub enum WriteError<W: SerialWrite<u8>> {
    Write(W::Error),
    HardwareTimeout,
    Format,
}

impl<W: SerialWrite<u8>> From<Stalled<W::Error>> for WriteError<W> {
    fn from(stalled: Stalled<W::Error>) -> Self {
        match stalled {
            Stalled::Failed(inner) => Self::Write(inner),
            Stalled::TimedOut => Self::HardwareTimeout,
        }
    }
}

pub enum ReadError<R: SerialRead<u8>> {
    Read(R::Error),
    HardwareTimeout,
}

impl<R: SerialRead<u8>> From<Stalled<R::Error>> for ReadError<R> {
    fn from(stalled: Stalled<R::Error>) -> Self {
        match stalled {
            Stalled::Failed(inner) => Self::Read(inner),
            Stalled::TimedOut => Self::HardwareTimeout,
        }
    }
}

pub enum IoError<S: SerialReadWrite> {
    Read(<S as SerialRead<u8>>::Error),
    Write(<S as SerialWrite<u8>>::Error),
    HardwareTimeout,
    Format,
}

impl<S: SerialReadWrite> From<ReadError<S>> for IoError<S> {
    fn from(inner: ReadError<S>) -> Self {
        match inner {
            ReadError::Read(inner) => Self::Read(inner),
            ReadError::HardwareTimeout => Self::HardwareTimeout,
        }
    }
}

impl<S: SerialReadWrite> From<WriteError<S>> for IoError<S> {
    fn from(inner: WriteError<S>) -> Self {
        match inner {
            WriteError::Write(inner) => Self::Write(inner),
            WriteError::HardwareTimeout => Self::HardwareTimeout,
            WriteError::Format => Self::Format,
        }
    }
}

/// Failure to read a number typed at the other end of the line.
pub enum InputError<R: SerialRead<u8>> {
    Read(ReadError<R>),
    Unexpected(u8),
    Overflow,
}

impl<R: SerialRead<u8>> From<ReadError<R>> for InputError<R> {
    fn from(inner: ReadError<R>) -> Self {
        Self::Read(inner)
    }
}

impl<W: SerialWrite<u8>> fmt::Debug for WriteError<W>
where
    W::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Write(inner) => f.debug_tuple("Write").field(inner).finish(),
            WriteError::HardwareTimeout => write!(f, "HardwareTimeout"),
            WriteError::Format => write!(f, "Format"),
        }
    }
}

impl<W: SerialWrite<u8>> fmt::Display for WriteError<W>
where
    W::Error: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Write(inner) => write!(f, "Write Error: {}", inner),
            WriteError::HardwareTimeout => write!(f, "Transmitter never became ready"),
            WriteError::Format => write!(f, "Formatting Error"),
        }
    }
}

impl<R: SerialRead<u8>> fmt::Debug for ReadError<R>
where
    R::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Read(inner) => f.debug_tuple("Read").field(inner).finish(),
            ReadError::HardwareTimeout => write!(f, "HardwareTimeout"),
        }
    }
}

impl<R: SerialRead<u8>> fmt::Display for ReadError<R>
where
    R::Error: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Read(inner) => write!(f, "Read Error: {}", inner),
            ReadError::HardwareTimeout => write!(f, "Nothing was received"),
        }
    }
}

impl<S: SerialReadWrite> fmt::Debug for IoError<S>
where
    <S as SerialRead<u8>>::Error: fmt::Debug,
    <S as SerialWrite<u8>>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Read(inner) => f.debug_tuple("Read").field(inner).finish(),
            IoError::Write(inner) => f.debug_tuple("Write").field(inner).finish(),
            IoError::HardwareTimeout => write!(f, "HardwareTimeout"),
            IoError::Format => write!(f, "Format"),
        }
    }
}

impl<S: SerialReadWrite> fmt::Display for IoError<S>
where
    <S as SerialRead<u8>>::Error: fmt::Display,
    <S as SerialWrite<u8>>::Error: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Read(inner) => write!(f, "Read Error: {}", inner),
            IoError::Write(inner) => write!(f, "Write Error: {}", inner),
            IoError::HardwareTimeout => write!(f, "Serial hardware timed out"),
            IoError::Format => write!(f, "Formatting Error"),
        }
    }
}

impl<R: SerialRead<u8>> fmt::Debug for InputError<R>
where
    R::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Read(inner) => f.debug_tuple("Read").field(inner).finish(),
            InputError::Unexpected(b) => f.debug_tuple("Unexpected").field(b).finish(),
            InputError::Overflow => write!(f, "Overflow"),
        }
    }
}

impl<R: SerialRead<u8>> fmt::Display for InputError<R>
where
    R::Error: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Read(inner) => fmt::Display::fmt(inner, f),
            InputError::Unexpected(b) => write!(f, "Unexpected input {:?}", *b as char),
            InputError::Overflow => write!(f, "Number too large"),
        }
    }
}

#[cfg(feature = "std")]
impl<S: SerialReadWrite> std::error::Error for IoError<S>
where
    <S as SerialRead<u8>>::Error: fmt::Debug + fmt::Display,
    <S as SerialWrite<u8>>::Error: fmt::Debug + fmt::Display,
{
}

#[cfg(feature = "std")]
impl<R: SerialRead<u8>> std::error::Error for ReadError<R> where
    R::Error: fmt::Debug + fmt::Display
{
}

#[cfg(feature = "std")]
impl<W: SerialWrite<u8>> std::error::Error for WriteError<W> where
    W::Error: fmt::Debug + fmt::Display
{
}

#[cfg(feature = "std")]
impl<R: SerialRead<u8>> std::error::Error for InputError<R> where
    R::Error: fmt::Debug + fmt::Display
{
}
