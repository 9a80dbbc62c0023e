// handlers - terminal business logic, split by access tier
//
// public:    no token (users, subscriptions)
// protected: bearer token required (newsletters)

pub mod protected;
pub mod public;
