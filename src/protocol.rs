//! Messages exchanged over a worker channel and their wire format.
//!
//! ``` text
//! request:  p | g | h | start | stride | end      (6 x i64, big-endian)
//! response: found                                 (1 byte, 0 or 1)
//!           solution                              (i64, big-endian, only if found)
//! ```
//!
//! Both ends validate every message: a length that does not match the
//! announced layout is rejected instead of being silently misread.
use crate::types::WorkAssignment;
use eyre::Result;

/// Size of an integer on the wire
const INT_SIZE: usize = 8;

/// Size of an encoded request
pub const REQUEST_SIZE: usize = 6 * INT_SIZE;

/// Answer of a worker to its request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    NotFound,
    Found(u64),
}

impl Response {
    pub fn solution(&self) -> Option<u64> {
        match self {
            Response::NotFound => None,
            Response::Found(x) => Some(*x),
        }
    }
}

impl From<Option<u64>> for Response {
    fn from(solution: Option<u64>) -> Self {
        solution.map_or(Response::NotFound, Response::Found)
    }
}

/// Append the given integer to the buffer as a big-endian `i64`.
/// - `buf`:    output buffer
/// - `name`:   field name, used in error messages
/// - `value`:  value to write
fn put_int(buf: &mut Vec<u8>, name: &str, value: u64) -> Result<()> {
    let value = i64::try_from(value)
        .map_err(|_| eyre::eyre!("Field `{}` does not fit in an i64: {}", name, value))?;
    buf.extend_from_slice(&value.to_be_bytes());
    Ok(())
}

/// Read a non-negative big-endian `i64`.
/// - `bytes`:  exactly `INT_SIZE` bytes
/// - `name`:   field name, used in error messages
fn get_int(bytes: &[u8], name: &str) -> Result<u64> {
    let raw: [u8; INT_SIZE] = bytes
        .try_into()
        .map_err(|_| eyre::eyre!("Field `{}` has {} bytes instead of {}!", name, bytes.len(), INT_SIZE))?;
    let value = i64::from_be_bytes(raw);
    u64::try_from(value).map_err(|_| eyre::eyre!("Field `{}` is negative: {}", name, value))
}

/// Encode a work assignment as a request.
/// - `assignment`: assignment to send
pub fn encode_request(assignment: &WorkAssignment) -> Result<Vec<u8>> {
    assignment.validate()?;
    let mut buf = Vec::with_capacity(REQUEST_SIZE);
    put_int(&mut buf, "p", assignment.p)?;
    put_int(&mut buf, "g", assignment.g)?;
    put_int(&mut buf, "h", assignment.h)?;
    put_int(&mut buf, "start", assignment.start)?;
    put_int(&mut buf, "stride", assignment.stride)?;
    put_int(&mut buf, "end", assignment.end)?;
    Ok(buf)
}

/// Decode and validate a request.
/// - `bytes`:  received message
pub fn decode_request(bytes: &[u8]) -> Result<WorkAssignment> {
    eyre::ensure!(
        bytes.len() == REQUEST_SIZE,
        "Malformed request: {} bytes instead of {}!",
        bytes.len(),
        REQUEST_SIZE
    );
    let mut fields = bytes.chunks_exact(INT_SIZE);
    let mut next = |name: &str| -> Result<u64> {
        let chunk = fields
            .next()
            .ok_or_else(|| eyre::eyre!("Missing request field `{}`!", name))?;
        get_int(chunk, name)
    };
    let assignment = WorkAssignment {
        p: next("p")?,
        g: next("g")?,
        h: next("h")?,
        start: next("start")?,
        stride: next("stride")?,
        end: next("end")?,
    };
    assignment.validate()?;
    Ok(assignment)
}

/// Encode a worker response.
/// - `response`:   response to send
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    match response {
        Response::NotFound => Ok(vec![0]),
        Response::Found(x) => {
            let mut buf = Vec::with_capacity(1 + INT_SIZE);
            buf.push(1);
            put_int(&mut buf, "solution", *x)?;
            Ok(buf)
        }
    }
}

/// Decode and validate a worker response.
/// - `bytes`:  received message
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    match bytes.split_first() {
        Some((0, rest)) => {
            eyre::ensure!(
                rest.is_empty(),
                "Malformed response: {} trailing bytes after `found = false`!",
                rest.len()
            );
            Ok(Response::NotFound)
        }
        Some((1, rest)) => Ok(Response::Found(get_int(rest, "solution")?)),
        Some((flag, _)) => eyre::bail!("Malformed response: invalid `found` flag {}!", flag),
        None => eyre::bail!("Malformed response: empty message!"),
    }
}
