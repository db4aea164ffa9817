//! Protocol constants

/// Modbus function code for Encapsulated Interface Transport
pub const FUNCTION_CODE: u8 = 0x2B;

/// Bit set on the function code of an exception response
pub const EXCEPTION_FLAG: u8 = 0x80;

/// MEI type for Read Device Identification
pub const MEI_DEVICE_IDENTIFICATION: u8 = 0x0E;

/// Conformity level: extended identification with individual access
pub const CONFORMITY_LEVEL: u8 = 0x83;

/// Maximum Modbus PDU length (RS485 ADU 256 - address 1 - CRC 2)
pub const MAX_PDU_LENGTH: usize = 253;

/// Function code byte that precedes every PDU body
pub const FUNCTION_CODE_LEN: usize = 1;

/// Request PDU length: function, MEI type, read code, object id
pub const REQUEST_LEN: usize = 4;

/// More-follows value when the object set continues in another response
pub const MORE_FOLLOWS: u8 = 0xFF;

/// More-follows value when the response is complete
pub const NO_MORE_FOLLOWS: u8 = 0x00;

/// Upper bound (exclusive) of the basic category
pub const BASIC_OBJECT_LIMIT: u8 = 0x04;

/// Upper bound (exclusive) of the regular category
pub const REGULAR_OBJECT_LIMIT: u8 = 0x80;

/// Maximum object data length (8-bit length field)
pub const MAX_OBJECT_DATA_LEN: usize = u8::MAX as usize;

/// Field offsets in a response body (function code stripped)
pub mod offsets {
    /// MEI type
    pub const MEI_TYPE: usize = 0;

    /// Read device id code
    pub const READ_CODE: usize = 1;

    /// Conformity level
    pub const CONFORMITY_LEVEL: usize = 2;

    /// More follows flag
    pub const MORE_FOLLOWS: usize = 3;

    /// Next object id
    pub const NEXT_OBJECT_ID: usize = 4;

    /// Number of objects in this response
    pub const OBJECT_COUNT: usize = 5;

    /// First `(id, length, data)` tuple
    pub const FIRST_OBJECT: usize = 6;
}

/// Fixed response header length (function code stripped)
pub const RESPONSE_HEADER_LEN: usize = offsets::FIRST_OBJECT;

/// Per-object overhead on the wire: id byte + length byte
pub const OBJECT_OVERHEAD: usize = 2;
