pub mod provider;

pub use provider::{
    ProviderConnection, ProviderData, ProviderEdge, ProviderStatusData, SubmitProviderInput,
    UpdateProviderInput,
};
