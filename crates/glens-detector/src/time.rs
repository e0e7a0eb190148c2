//! GPS time to Greenwich mean sidereal time.

use std::f64::consts::TAU;

/// GPS times at which a leap second was inserted.
const LEAP_SECONDS: [f64; 18] = [
    46_828_800.0,
    78_364_801.0,
    109_900_802.0,
    173_059_203.0,
    252_028_804.0,
    315_187_205.0,
    346_723_206.0,
    393_984_007.0,
    425_520_008.0,
    457_056_009.0,
    504_489_610.0,
    551_750_411.0,
    599_184_012.0,
    820_108_813.0,
    914_803_214.0,
    1_025_136_015.0,
    1_119_744_016.0,
    1_167_264_017.0,
];

/// Julian date of the GPS epoch, 1980-01-06 00:00:00 UTC.
const GPS_EPOCH_JD: f64 = 2_444_244.5;

/// Julian date of J2000.0.
const J2000_JD: f64 = 2_451_545.0;

/// Accumulated GPS-UTC offset at `gps_time`.
pub fn leap_seconds(gps_time: f64) -> f64 {
    LEAP_SECONDS.iter().filter(|leap| **leap <= gps_time).count() as f64
}

/// Greenwich mean sidereal time (rad, in `[0, 2π)`) at `gps_time`.
///
/// IAU 1982 polynomial with UT1 approximated by UTC.
pub fn greenwich_mean_sidereal_time(gps_time: f64) -> f64 {
    let utc = gps_time - leap_seconds(gps_time);
    let julian_date = GPS_EPOCH_JD + utc / 86_400.0;
    let centuries = (julian_date - J2000_JD) / 36_525.0;
    let seconds = 67_310.548_41
        + (876_600.0 * 3_600.0 + 8_640_184.812_866) * centuries
        + 0.093_104 * centuries * centuries
        - 6.2e-6 * centuries * centuries * centuries;
    (seconds.rem_euclid(86_400.0) / 86_400.0) * TAU
}
