//! Nutation and obliquity of the ecliptic
//!
//! Nutation follows the IAU 2000B model: the 77 largest lunisolar terms of
//! IAU 2000A plus fixed offsets standing in for the planetary terms. It agrees
//! with the full model to about a milliarcsecond between 1995 and 2050.
//! Mean obliquity is the IAU 2006 polynomial.

use crate::constants::{ASEC2RAD, ASEC360, TAU};

/// Mean obliquity of the ecliptic at J2000.0 (arcseconds, IAU 2006)
pub const OBLIQUITY_J2000_ARCSEC: f64 = 84_381.406;

/// Mean obliquity of the ecliptic in radians
///
/// `t` is TDB in Julian centuries since J2000.0.
pub fn mean_obliquity(t: f64) -> f64 {
    let arcsec = ((((-0.000_000_043_4 * t - 0.000_000_576) * t + 0.002_003_40) * t
        - 0.000_183_1)
        * t
        - 46.836_769)
        * t
        + OBLIQUITY_J2000_ARCSEC;
    arcsec * ASEC2RAD
}

/// Delaunay fundamental arguments in radians: `[l, l', F, D, Ω]`
///
/// `t` is TDB in Julian centuries since J2000.0 (IERS Conventions 2010,
/// Table 5.2e).
pub fn fundamental_arguments(t: f64) -> [f64; 5] {
    let poly = |a0: f64, a1: f64, a2: f64, a3: f64, a4: f64| {
        let arcsec = (((a4 * t + a3) * t + a2) * t + a1) * t + a0;
        (arcsec % ASEC360) * ASEC2RAD
    };

    [
        poly(485_868.249_036, 1_717_915_923.217_8, 31.879_2, 0.051_635, -0.000_244_70),
        poly(1_287_104.793_05, 129_596_581.048_1, -0.553_2, 0.000_136, -0.000_011_49),
        poly(335_779.526_232, 1_739_527_262.847_8, -12.751_2, -0.001_037, 0.000_004_17),
        poly(1_072_260.703_69, 1_602_961_601.209_0, -6.370_6, 0.006_593, -0.000_031_69),
        poly(450_160.398_036, -6_962_890.543_1, 7.472_2, 0.007_702, -0.000_059_39),
    ]
}

/// Multipliers of `[l, l', F, D, Ω]` followed by the longitude amplitudes
/// `S, S'` and obliquity amplitudes `C, C'` in units of 0.1 µas.
#[rustfmt::skip]
const LUNISOLAR_TERMS: [[i64; 9]; 77] = [
    [ 0,  0,  0,  0,  1, -172_064_161, -174_666, 92_052_331,  9_086],
    [ 0,  0,  2, -2,  2,  -13_170_906,   -1_675,  5_730_336, -3_015],
    [ 0,  0,  2,  0,  2,   -2_276_413,     -234,    978_459,   -485],
    [ 0,  0,  0,  0,  2,    2_074_554,      207,   -897_492,    470],
    [ 0,  1,  0,  0,  0,    1_475_877,   -3_633,     73_871,   -184],
    [ 0,  1,  2, -2,  2,     -516_821,    1_226,    224_386,   -677],
    [ 1,  0,  0,  0,  0,      711_159,       73,     -6_750,      0],
    [ 0,  0,  2,  0,  1,     -387_298,     -367,    200_728,     18],
    [ 1,  0,  2,  0,  2,     -301_461,      -36,    129_025,    -63],
    [ 0, -1,  2, -2,  2,      215_829,     -494,    -95_929,    299],
    [ 0,  0,  2, -2,  1,      128_227,      137,    -68_982,     -9],
    [-1,  0,  2,  0,  2,      123_457,       11,    -53_311,     32],
    [-1,  0,  0,  2,  0,      156_994,       10,     -1_235,      0],
    [ 1,  0,  0,  0,  1,       63_110,       63,    -33_228,      0],
    [-1,  0,  0,  0,  1,      -57_976,      -63,     31_429,      0],
    [-1,  0,  2,  2,  2,      -59_641,      -11,     25_543,    -11],
    [ 1,  0,  2,  0,  1,      -51_613,      -42,     26_366,      0],
    [-2,  0,  2,  0,  1,       45_893,       50,    -24_236,    -10],
    [ 0,  0,  0,  2,  0,       63_384,       11,     -1_220,      0],
    [ 0,  0,  2,  2,  2,      -38_571,       -1,     16_452,    -11],
    [ 0, -2,  2, -2,  2,       32_481,        0,    -13_870,      0],
    [-2,  0,  0,  2,  0,      -47_722,        0,        477,      0],
    [ 2,  0,  2,  0,  2,      -31_046,       -1,     13_238,    -11],
    [ 1,  0,  2, -2,  2,       28_593,        0,    -12_338,     10],
    [-1,  0,  2,  0,  1,       20_441,       21,    -10_758,      0],
    [ 2,  0,  0,  0,  0,       29_243,        0,       -609,      0],
    [ 0,  0,  2,  0,  0,       25_887,        0,       -550,      0],
    [ 0,  1,  0,  0,  1,      -14_053,      -25,      8_551,     -2],
    [-1,  0,  0,  2,  1,       15_164,       10,     -8_001,      0],
    [ 0,  2,  2, -2,  2,      -15_794,       72,      6_850,    -42],
    [ 0,  0, -2,  2,  0,       21_783,        0,       -167,      0],
    [ 1,  0,  0, -2,  1,      -12_873,      -10,      6_953,      0],
    [ 0, -1,  0,  0,  1,      -12_654,       11,      6_415,      0],
    [-1,  0,  2,  2,  1,      -10_204,        0,      5_222,      0],
    [ 0,  2,  0,  0,  0,       16_707,      -85,        168,     -1],
    [ 1,  0,  2,  2,  2,       -7_691,        0,      3_268,      0],
    [-2,  0,  2,  0,  0,      -11_024,        0,        104,      0],
    [ 0,  1,  2,  0,  2,        7_566,      -21,     -3_250,      0],
    [ 0,  0,  2,  2,  1,       -6_637,      -11,      3_353,      0],
    [ 0, -1,  2,  0,  2,       -7_141,       21,      3_070,      0],
    [ 0,  0,  0,  2,  1,       -6_302,      -11,      3_272,      0],
    [ 1,  0,  2, -2,  1,        5_800,       10,     -3_045,      0],
    [ 2,  0,  2, -2,  2,        6_443,        0,     -2_768,      0],
    [-2,  0,  0,  2,  1,       -5_774,      -11,      3_041,      0],
    [ 2,  0,  2,  0,  1,       -5_350,        0,      2_695,      0],
    [ 0, -1,  2, -2,  1,       -4_752,      -11,      2_719,      0],
    [ 0,  0,  0, -2,  1,       -4_940,      -11,      2_720,      0],
    [-1, -1,  0,  2,  0,        7_350,        0,        -51,      0],
    [ 2,  0,  0, -2,  1,       -4_803,      -11,      2_556,      0],
    [ 1,  0,  0,  2,  0,       -7_677,        0,        462,      0],
    [ 0,  1,  2, -2,  1,        5_417,        0,     -2_520,      0],
    [ 1, -1,  0,  0,  0,        6_624,        0,       -468,      0],
    [-2,  0,  2,  0,  2,       -5_433,        0,      2_334,      0],
    [ 3,  0,  2,  0,  2,       -4_632,        0,      1_991,      0],
    [ 0, -1,  0,  2,  0,        6_106,        0,       -167,      0],
    [ 1, -1,  2,  0,  2,       -3_593,        0,      1_556,      0],
    [ 0,  0,  0,  1,  0,       -4_766,        0,        270,      0],
    [-1, -1,  2,  2,  2,       -4_095,        0,      1_793,      0],
    [-1,  0,  2,  0,  0,        4_229,        0,       -101,      0],
    [ 0, -1,  2,  2,  2,       -3_372,        0,      1_487,      0],
    [ 2,  0,  0,  0,  1,       -3_353,        0,      1_758,      0],
    [ 1,  0,  2,  0,  0,       -3_523,        0,        246,      0],
    [ 1,  1,  0,  0,  0,       -3_613,        0,        329,      0],
    [-1,  0,  2, -2,  1,        3_522,        0,     -1_830,      0],
    [ 2,  0,  0,  0, -1,        3_312,        0,     -1_730,      0],
    [ 0,  0, -2,  2,  1,       -3_142,        0,      1_704,      0],
    [ 0,  1,  0,  0, -1,       -2_927,        0,      1_564,      0],
    [ 0,  1,  2,  0,  1,       -2_887,        0,      1_401,      0],
    [ 0, -1,  2,  0,  1,        2_451,        0,     -1_200,      0],
    [ 2,  0, -2,  0,  0,       -2_790,        0,        410,      0],
    [-1,  0,  0,  2, -1,        2_145,        0,     -1_154,      0],
    [ 0,  0,  2, -2,  0,        2_816,        0,        286,      0],
    [ 0,  1,  0, -2,  0,        2_700,        0,       -258,      0],
    [ 1,  0,  0, -1,  0,       -2_330,        0,        -37,      0],
    [ 0,  0,  0,  0,  2,        2_283,        0,     -1_039,      0],
    [ 1,  0, -2,  0,  0,       -2_321,        0,        284,      0],
    [-1,  0,  0,  1,  1,       -2_049,        0,      1_112,      0],
];

/// Fixed offsets replacing the planetary nutation terms (arcseconds)
const PLANETARY_OFFSET_PSI: f64 = -0.000_135;
const PLANETARY_OFFSET_EPS: f64 = -0.000_388;

/// Nutation in longitude and obliquity `(Δψ, Δε)` in radians
///
/// `t` is TDB in Julian centuries since J2000.0.
pub fn iau2000b_radians(t: f64) -> (f64, f64) {
    let args = fundamental_arguments(t);

    let (mut dpsi, mut deps) = (0.0, 0.0);
    for row in LUNISOLAR_TERMS.iter() {
        let arg: f64 = row[..5]
            .iter()
            .zip(args.iter())
            .map(|(&n, a)| n as f64 * a)
            .sum();
        let (sin_arg, cos_arg) = (arg % TAU).sin_cos();
        dpsi += (row[5] as f64 + row[6] as f64 * t) * sin_arg;
        deps += (row[7] as f64 + row[8] as f64 * t) * cos_arg;
    }

    // 0.1 µas -> arcseconds
    let dpsi = dpsi * 1e-7 + PLANETARY_OFFSET_PSI;
    let deps = deps * 1e-7 + PLANETARY_OFFSET_EPS;
    (dpsi * ASEC2RAD, deps * ASEC2RAD)
}

/// Equation of the equinoxes in radians
///
/// Δψ cos ε plus the two leading complementary terms, which depend only on
/// the longitude of the Moon's node.
pub fn equation_of_the_equinoxes(t: f64, dpsi: f64, mean_obliquity: f64) -> f64 {
    let omega = fundamental_arguments(t)[4];
    let complementary =
        (0.002_640_96 * omega.sin() + 0.000_063_52 * (2.0 * omega).sin()) * ASEC2RAD;
    dpsi * mean_obliquity.cos() + complementary
}
