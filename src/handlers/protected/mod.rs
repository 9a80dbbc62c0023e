// handlers/protected - endpoints behind the bearer token stage
//
// Every handler here reads the caller from `AuthSubject` and scopes its
// reads and writes to records that caller owns.

pub mod newsletters;
