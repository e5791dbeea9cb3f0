/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

/// flatten nested `if let ..` chains, mirrors Scala for-comprehensions for side effects only.
#[macro_export]
macro_rules! if_let {
    { $p:pat = $x:expr => $r:expr } => {
        if let $p = $x { $r }
    };
    { $p:pat = $x:expr , $($ts:tt)+ } => {
        if let $p = $x {
            if_let! { $($ts)+ }
        }
    };
}
pub use if_let;

#[macro_export]
macro_rules! io_error {
    ( $kind:expr, $fmt:literal $(, $arg:expr)* ) => {
        std::io::Error::new( $kind, format!($fmt $(, $arg)*))
    }
}
pub use io_error;
