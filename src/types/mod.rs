pub use self::{
    balance::Balance,
    dtrade_type::{
        Burned_Type, Fees_Claimed_Type, Issued_Type, Target_Updated_Type,
        Transfer_Type, Vested_Type,
    },
    envelope::{Event_Envelope, Event_Kind},
    perp_type::{Log_Trade_Type, Position_Changed_Type},
    rates_type::Rates_Updated_Type,
};

mod balance;
mod dtrade_type;
mod envelope;
mod perp_type;
mod rates_type;
