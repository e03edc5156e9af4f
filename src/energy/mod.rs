//! Battery, drive kinematics and the simulation calendar.

mod battery;
mod clock;
mod kinematics;

pub use battery::{Battery, ChargeCurve, ChargeProfile, seasonal_weight};
pub use clock::{CalendarContext, DATE_FORMAT, SimClock};
pub use kinematics::{DifferentialDrive, MotorCommand, Velocity2D};
