// handlers/public - endpoints reachable without a token
//
// Registration and login hand out tokens; subscriptions are managed by
// readers who never hold an account.

pub mod subscriptions;
pub mod users;
